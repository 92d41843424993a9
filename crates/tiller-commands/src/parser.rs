//! Argument tokenizer and conversion pipeline.
//!
//! Consumes the remainder of the input after alias stripping and produces one
//! converted value per declared parameter. Tokenization honors the configured
//! quotation pairs and escape character; a remainder tail takes the rest of
//! the input verbatim, and a variadic tail loops the tokenizer until the
//! input is exhausted.

use tiller_types::{CommandContext, CommandError};

use crate::config::{CommandConfig, MultiMatchHandling};
use crate::info::{CommandInfo, ParameterInfo};
use crate::value::{ArgValue, Args};

/// Byte-offset cursor over the input, so the remainder tail can be handed
/// over as a verbatim slice.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn consume_all(&mut self) {
        self.pos = self.input.len();
    }

    fn skip_separators(&mut self, separator: char) {
        while self.peek() == Some(separator) {
            self.bump();
        }
    }
}

/// Consume one token: a quoted span if the next character opens a configured
/// quote, otherwise everything up to the next unescaped separator.
fn next_token(cur: &mut Cursor<'_>, config: &CommandConfig) -> Result<String, CommandError> {
    let mut out = String::new();
    let first = match cur.peek() {
        Some(c) => c,
        None => return Ok(out),
    };

    if let Some(close) = config.quote_close(first) {
        cur.bump();
        loop {
            match cur.bump() {
                None => {
                    return Err(CommandError::ParseFailed(format!(
                        "unterminated quote opened with {first:?}"
                    )))
                }
                Some(c) if config.escape == Some(c) => match cur.bump() {
                    Some(escaped) => out.push(escaped),
                    None => {
                        return Err(CommandError::ParseFailed(format!(
                            "unterminated quote opened with {first:?}"
                        )))
                    }
                },
                Some(c) if c == close => break,
                Some(c) => out.push(c),
            }
        }
        return Ok(out);
    }

    while let Some(c) = cur.peek() {
        if c == config.separator {
            break;
        }
        cur.bump();
        if config.escape == Some(c) {
            match cur.bump() {
                Some(escaped) => out.push(escaped),
                // Trailing escape character is kept literally.
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Convert one token with the parameter's reader, applying the multi-match
/// policy when several ranked candidates come back.
async fn convert(
    param: &ParameterInfo,
    ctx: &CommandContext,
    token: &str,
    config: &CommandConfig,
) -> Result<ArgValue, CommandError> {
    let mut candidates = param.reader().read(ctx, token).await?;
    match candidates.len() {
        0 => Err(CommandError::ObjectNotFound {
            input: token.to_string(),
        }),
        1 => Ok(candidates.remove(0).value),
        _ => match config.multi_match {
            MultiMatchHandling::Exception => Err(CommandError::MultipleMatches {
                input: token.to_string(),
            }),
            MultiMatchHandling::Best => {
                // Strict comparison keeps the earliest candidate on ties,
                // making the pick deterministic.
                let mut best = 0;
                for (i, candidate) in candidates.iter().enumerate() {
                    if candidate.score > candidates[best].score {
                        best = i;
                    }
                }
                Ok(candidates.remove(best).value)
            }
        },
    }
}

/// Parse the post-alias input against a command's parameter list.
pub(crate) async fn parse_args(
    command: &CommandInfo,
    ctx: &CommandContext,
    input: &str,
    config: &CommandConfig,
) -> Result<Args, CommandError> {
    let params = command.parameters();
    let mut cur = Cursor::new(input);
    let mut values: Vec<(String, Option<ArgValue>)> = Vec::with_capacity(params.len());

    for param in params {
        cur.skip_separators(config.separator);

        if param.is_remainder() {
            let rest = cur.rest();
            if rest.is_empty() {
                if !param.is_optional() {
                    return Err(CommandError::BadArgCount(format!(
                        "missing required parameter {:?}",
                        param.name()
                    )));
                }
                values.push((param.name().to_string(), param.default_value().cloned()));
            } else {
                let value = convert(param, ctx, rest, config).await?;
                values.push((param.name().to_string(), Some(value)));
            }
            cur.consume_all();
            continue;
        }

        if param.is_variadic() {
            let mut items: Vec<ArgValue> = Vec::new();
            loop {
                cur.skip_separators(config.separator);
                if cur.at_end() {
                    break;
                }
                let token = next_token(&mut cur, config)?;
                items.push(convert(param, ctx, &token, config).await?);
            }
            values.push((param.name().to_string(), Some(ArgValue::new(items))));
            continue;
        }

        if cur.at_end() {
            if !param.is_optional() {
                return Err(CommandError::BadArgCount(format!(
                    "missing required parameter {:?}",
                    param.name()
                )));
            }
            values.push((param.name().to_string(), param.default_value().cloned()));
            continue;
        }

        let token = next_token(&mut cur, config)?;
        let value = convert(param, ctx, &token, config).await?;
        values.push((param.name().to_string(), Some(value)));
    }

    cur.skip_separators(config.separator);
    if cur.at_end() {
        return Ok(Args::new(values));
    }
    if !config.ignore_extra_args {
        return Err(CommandError::BadArgCount(
            "the input has too many parameters".to_string(),
        ));
    }
    // Ignored overflow stays visible to transports that want it.
    Ok(Args::new(values).with_remaining(cur.rest()))
}
