use std::{
    collections::VecDeque,
    io::{BufRead, Write},
};

use derivative::Derivative;
use log::debug;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::types::{Field, OdometryParams, Prompt, RelayError, RelayResult};

/// Where lines of operator input come from.
pub trait LineSource {
    /// Announces the question the next values answer.
    fn prompt(&mut self, text: &str) -> RelayResult<()>;

    /// Next line of input, `None` once the input is exhausted.
    fn next_line(&mut self) -> RelayResult<Option<String>>;
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn prompt(&mut self, text: &str) -> RelayResult<()> {
        (**self).prompt(text)
    }

    fn next_line(&mut self) -> RelayResult<Option<String>> {
        (**self).next_line()
    }
}

pub fn read_params(source: impl LineSource) -> RelayResult<OdometryParams> {
    let mut reader = TokenReader::new(source);
    let mut params = OdometryParams::default();

    for prompt in Prompt::ALL {
        reader.prompt(prompt)?;

        for &field in prompt.fields() {
            let value = reader.next_number(field)?;
            debug!("{field} = {value}");
            *params.field_mut(field) = value;
        }
    }

    Ok(params)
}

// a comment only starts at the beginning of a token, `0.05#x` stays one (bad) token
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    static REGEX: OnceCell<Regex> = OnceCell::new();
    let regex = REGEX.get_or_init(|| Regex::new(r"\S+").unwrap());

    regex
        .find_iter(text)
        .map(|m| m.as_str())
        .take_while(|s| !s.starts_with('#'))
}

pub fn parse_number(field: Field, token: &str) -> RelayResult<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RelayError::InvalidNumber {
            field,
            token: token.to_string(),
        })
}

/// Hands out tokens one at a time, pulling lines from the source only when
/// the ones already read are used up.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct TokenReader<S> {
    #[derivative(Debug = "ignore")]
    source: S,
    pending: VecDeque<String>,
}

impl<S: LineSource> TokenReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
        }
    }

    pub fn prompt(&mut self, prompt: Prompt) -> RelayResult<()> {
        self.source.prompt(prompt.text())
    }

    pub fn next_token(&mut self) -> RelayResult<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            let Some(line) = self.source.next_line()? else { return Ok(None) };
            self.pending.extend(tokenize(&line).map(String::from));
        }
    }

    pub fn next_number(&mut self, field: Field) -> RelayResult<f64> {
        let Some(token) = self.next_token()? else {
            return Err(RelayError::MissingValue(field));
        };

        parse_number(field, &token)
    }
}

/// Plain line-by-line input with prompts written to a separate stream.
pub struct StreamSource<R, W> {
    input: R,
    prompts: W,
}

impl<R: BufRead, W: Write> StreamSource<R, W> {
    pub fn new(input: R, prompts: W) -> Self {
        Self { input, prompts }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.prompts)
    }
}

impl<R: BufRead, W: Write> LineSource for StreamSource<R, W> {
    fn prompt(&mut self, text: &str) -> RelayResult<()> {
        write!(self.prompts, "{text}")?;
        self.prompts.flush()?;
        Ok(())
    }

    fn next_line(&mut self) -> RelayResult<Option<String>> {
        let mut line = String::new();

        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use approx::assert_relative_eq;

    use super::*;
    use crate::types::Pose;

    fn run(input: &str) -> (RelayResult<OdometryParams>, String) {
        let mut source = StreamSource::new(Cursor::new(input), Vec::new());
        let res = read_params(&mut source);
        let (_, prompts) = source.into_inner();

        (res, String::from_utf8(prompts).unwrap())
    }

    fn all_prompts() -> String {
        Prompt::ALL.iter().map(|p| p.text()).collect()
    }

    #[test]
    fn tokenize_splits_on_whitespace_only() {
        let tokens: Vec<_> = tokenize("  1.2 3.4\t0.5   -7 \n").collect();
        assert_eq!(tokens, ["1.2", "3.4", "0.5", "-7"]);

        let tokens: Vec<_> = tokenize("0,05 1.2, 3.4").collect();
        assert_eq!(tokens, ["0,05", "1.2,", "3.4"]);
    }

    #[test]
    fn tokenize_skips_comments() {
        let tokens: Vec<_> = tokenize("0.05 # wheel radius, metres").collect();
        assert_eq!(tokens, ["0.05"]);

        let tokens: Vec<_> = tokenize("0.3 #width 7").collect();
        assert_eq!(tokens, ["0.3"]);

        let tokens: Vec<_> = tokenize("0.05#x 0.3").collect();
        assert_eq!(tokens, ["0.05#x", "0.3"]);

        assert_eq!(tokenize("# nothing here").count(), 0);
        assert_eq!(tokenize("   ").count(), 0);
    }

    #[test]
    fn parse_number_accepts_plain_numbers() {
        assert_relative_eq!(parse_number(Field::StartHeading, "-1.57").unwrap(), -1.57);
        assert_relative_eq!(parse_number(Field::EncoderPulses, "1e3").unwrap(), 1000.0);
        assert_relative_eq!(parse_number(Field::EncoderPulses, "+20").unwrap(), 20.0);
        assert_relative_eq!(parse_number(Field::ElapsedTime, ".5").unwrap(), 0.5);
    }

    #[test]
    fn parse_number_rejects_garbage_and_non_finite() {
        for token in ["abc", "1.2.3", "0x10", "inf", "-inf", "NaN", "1,5"] {
            let err = parse_number(Field::WheelRadius, token).unwrap_err();
            assert!(
                matches!(&err, RelayError::InvalidNumber { field: Field::WheelRadius, token: t } if t == token),
                "{token}: {err:?}"
            );
        }
    }

    #[test]
    fn reads_all_values_from_one_line() {
        let (res, prompts) = run("20 1000 0.05 0.3 0 0 0 1.0\n");
        let params = res.unwrap();

        assert_eq!(params.encoder_pulses, 20.0);
        assert_eq!(params.pulses_per_second, 1000.0);
        assert_relative_eq!(params.wheel_radius, 0.05);
        assert_relative_eq!(params.vehicle_width, 0.3);
        assert_eq!(params.start_pose, Pose::default());
        assert_eq!(params.elapsed_time, 1.0);
        assert_eq!(params.to_string(), "20 1000 0.05 0.3 0 0 0 1");

        assert_eq!(prompts, all_prompts());
    }

    #[test]
    fn reads_one_answer_per_line() {
        let (res, prompts) = run("500\n2500\n0.075\n0.35\n1.2 3.4 0.5\n2.5\n");

        assert_eq!(res.unwrap().to_string(), "500 2500 0.075 0.35 1.2 3.4 0.5 2.5");
        assert_eq!(prompts, all_prompts());
    }

    #[test]
    fn pose_may_span_lines() {
        let (res, _) = run("20\n1000\n0.05\n0.3\n1.2\n\n3.4\n-1.57\n0\n");
        let params = res.unwrap();

        assert_relative_eq!(params.start_pose.x, 1.2);
        assert_relative_eq!(params.start_pose.y, 3.4);
        assert_relative_eq!(params.start_pose.heading, -1.57);
        assert_eq!(params.elapsed_time, 0.0);
    }

    #[test]
    fn commented_parameter_file() {
        let input = "\
# robot A
20      # pulses per revolution
1000    # pulses per second
0.05 0.3
1.0 2.0 -0.5  # start pose
3
";
        let (res, _) = run(input);
        assert_eq!(res.unwrap().to_string(), "20 1000 0.05 0.3 1 2 -0.5 3");
    }

    #[test]
    fn extra_tokens_are_ignored() {
        let (res, _) = run("1 2 3 4 5 6 7 8 9 10\n");
        assert_eq!(res.unwrap().values(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn empty_input_is_missing_the_first_value() {
        let (res, prompts) = run("");

        assert!(matches!(res, Err(RelayError::MissingValue(Field::EncoderPulses))));
        assert_eq!(prompts, Prompt::EncoderPulses.text());
    }

    #[test]
    fn short_input_names_the_missing_field() {
        let (res, prompts) = run("20 1000 0.05 0.3 0 0 0");

        assert!(matches!(res, Err(RelayError::MissingValue(Field::ElapsedTime))));
        assert_eq!(prompts, all_prompts());

        let (res, _) = run("20 1000 0.05 0.3 0 0\n");
        assert!(matches!(res, Err(RelayError::MissingValue(Field::StartHeading))));
    }

    #[test]
    fn malformed_token_stops_the_run() {
        let (res, prompts) = run("20 1000 abc 0.3 0 0 0 1\n");

        match res {
            Err(RelayError::InvalidNumber { field, token }) => {
                assert_eq!(field, Field::WheelRadius);
                assert_eq!(token, "abc");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }

        let asked: String = Prompt::ALL[..3].iter().map(|p| p.text()).collect();
        assert_eq!(prompts, asked);
    }

    #[test]
    fn decimal_comma_is_not_a_separator() {
        let (res, _) = run("20 1000 0,05 0.3 0 0 0 1\n");

        match res {
            Err(RelayError::InvalidNumber { field, token }) => {
                assert_eq!(field, Field::WheelRadius);
                assert_eq!(token, "0,05");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }

        let (res, _) = run("20\n1000\n0.05\n0.3\n1.2, 3.4, 0.5\n1\n");
        assert!(matches!(
            res,
            Err(RelayError::InvalidNumber { field: Field::StartX, .. })
        ));
    }

    #[test]
    fn comment_glued_to_a_value_is_reported() {
        let (res, _) = run("20 1000 0.05#x 0.3 0 0 0 1\n");

        match res {
            Err(RelayError::InvalidNumber { field, token }) => {
                assert_eq!(field, Field::WheelRadius);
                assert_eq!(token, "0.05#x");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
    }

    #[test]
    fn token_reader_keeps_type_ahead() {
        let mut reader = TokenReader::new(StreamSource::new(Cursor::new("1 2\n\n3\n"), io::sink()));

        assert_eq!(reader.next_token().unwrap().as_deref(), Some("1"));
        assert_eq!(reader.next_token().unwrap().as_deref(), Some("2"));
        assert_eq!(reader.next_number(Field::ElapsedTime).unwrap(), 3.0);
        assert!(reader.next_token().unwrap().is_none());
        assert!(matches!(
            reader.next_number(Field::ElapsedTime),
            Err(RelayError::MissingValue(Field::ElapsedTime))
        ));
    }
}
