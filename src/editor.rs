use derivative::Derivative;
use rustyline::{config::Behavior, error::ReadlineError, Config, DefaultEditor};

use crate::{reader::LineSource, types::RelayResult};

/// Interactive input with line editing and history.
///
/// Prompts are drawn on the controlling terminal, so standard output only
/// ever carries the relayed values.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct EditorSource {
    #[derivative(Debug = "ignore")]
    editor: DefaultEditor,
    prompt: String,
}

impl EditorSource {
    pub fn new() -> RelayResult<Self> {
        // stdout is usually piped into the next stage
        let config = Config::builder().behavior(Behavior::PreferTerm).build();

        Ok(Self {
            editor: DefaultEditor::with_config(config)?,
            prompt: String::new(),
        })
    }
}

impl LineSource for EditorSource {
    // shown with the next line read; a prompt answered by type-ahead is not redrawn
    fn prompt(&mut self, text: &str) -> RelayResult<()> {
        self.prompt = text.to_string();
        Ok(())
    }

    fn next_line(&mut self) -> RelayResult<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                self.editor.add_history_entry(&line)?;
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
