//! String functions. Positions are 1-based.

use crate::data::{ExprType, ExprValue};
use crate::error::QueryResult;
use crate::expression::function::FunctionRepository;

use ExprType::{Integer, String as Str};

pub(super) fn register(repository: &mut FunctionRepository) {
    repository.register_scalar("upper", vec![Str], Str, |args| {
        Ok(ExprValue::from(args[0].string_value()?.to_uppercase()))
    });
    repository.register_scalar("lower", vec![Str], Str, |args| {
        Ok(ExprValue::from(args[0].string_value()?.to_lowercase()))
    });
    repository.register_scalar("trim", vec![Str], Str, |args| {
        Ok(ExprValue::from(args[0].string_value()?.trim()))
    });
    repository.register_scalar("ltrim", vec![Str], Str, |args| {
        Ok(ExprValue::from(args[0].string_value()?.trim_start()))
    });
    repository.register_scalar("rtrim", vec![Str], Str, |args| {
        Ok(ExprValue::from(args[0].string_value()?.trim_end()))
    });
    repository.register_scalar("length", vec![Str], Integer, |args| {
        Ok(ExprValue::Integer(args[0].string_value()?.len() as i32))
    });
    repository.register_scalar("concat", vec![Str, Str], Str, concat);
    repository.register_scalar("substring", vec![Str, Integer], Str, substring);
    repository.register_scalar("substring", vec![Str, Integer, Integer], Str, substring);
    repository.register_scalar("substr", vec![Str, Integer], Str, substring);
    repository.register_scalar("substr", vec![Str, Integer, Integer], Str, substring);
    repository.register_scalar("left", vec![Str, Integer], Str, left);
    repository.register_scalar("right", vec![Str, Integer], Str, right);
    repository.register_scalar("ascii", vec![Str], Integer, ascii);
    repository.register_scalar("locate", vec![Str, Str], Integer, locate);
    repository.register_scalar("locate", vec![Str, Str, Integer], Integer, locate);
    repository.register_scalar("replace", vec![Str, Str, Str], Str, |args| {
        Ok(ExprValue::from(
            args[0]
                .string_value()?
                .replace(args[1].string_value()?, args[2].string_value()?),
        ))
    });
    repository.register_scalar("strcmp", vec![Str, Str], Integer, |args| {
        let ordering = args[0].string_value()?.cmp(args[1].string_value()?);
        Ok(ExprValue::Integer(ordering as i32))
    });
}

fn concat(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let mut result = String::new();
    for arg in args {
        result.push_str(arg.string_value()?);
    }
    Ok(ExprValue::from(result))
}

/// `substring(str, start[, len])`. A negative start counts from the end,
/// zero yields the empty string.
fn substring(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let chars: Vec<char> = args[0].string_value()?.chars().collect();
    let start = args[1].integer_value()?;
    let len = chars.len() as i64;

    let begin = match start {
        0 => return Ok(ExprValue::from("")),
        s if s > 0 => (s as i64 - 1).min(len),
        s => (len + s as i64).max(0),
    };
    let end = match args.get(2) {
        Some(length) => {
            let length = length.integer_value()?;
            if length <= 0 {
                return Ok(ExprValue::from(""));
            }
            (begin + length as i64).min(len)
        }
        None => len,
    };
    Ok(ExprValue::from(
        chars[begin as usize..end as usize].iter().collect::<String>(),
    ))
}

fn left(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let text = args[0].string_value()?;
    let count = args[1].integer_value()?.max(0) as usize;
    Ok(ExprValue::from(text.chars().take(count).collect::<String>()))
}

fn right(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let chars: Vec<char> = args[0].string_value()?.chars().collect();
    let count = (args[1].integer_value()?.max(0) as usize).min(chars.len());
    Ok(ExprValue::from(
        chars[chars.len() - count..].iter().collect::<String>(),
    ))
}

fn ascii(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let code = args[0].string_value()?.bytes().next().unwrap_or(0);
    Ok(ExprValue::Integer(code as i32))
}

/// `locate(substr, str[, pos])`: position of `substr` in `str`, 0 if absent.
fn locate(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let needle: Vec<char> = args[0].string_value()?.chars().collect();
    let haystack: Vec<char> = args[1].string_value()?.chars().collect();
    let from = match args.get(2) {
        Some(pos) => (pos.integer_value()?.max(1) - 1) as usize,
        None => 0,
    };
    if needle.is_empty() {
        return Ok(ExprValue::Integer((from + 1) as i32));
    }
    let position = (from..haystack.len())
        .find(|&i| haystack[i..].starts_with(&needle))
        .map(|i| i as i32 + 1)
        .unwrap_or(0);
    Ok(ExprValue::Integer(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;

    fn eval(name: &str, args: Vec<ExprValue>) -> anyhow::Result<ExprValue> {
        let repository = FunctionRepository::with_builtins();
        let args = args.into_iter().map(Expression::Literal).collect();
        Ok(repository.compile(name, args)?.value_of(&ExprValue::Null)?)
    }

    fn s(text: &str) -> ExprValue {
        ExprValue::from(text)
    }

    #[test]
    fn test_case_and_trim() -> anyhow::Result<()> {
        assert_eq!(eval("upper", vec![s("abc")])?, s("ABC"));
        assert_eq!(eval("lower", vec![s("ABC")])?, s("abc"));
        assert_eq!(eval("trim", vec![s("  a  ")])?, s("a"));
        assert_eq!(eval("ltrim", vec![s("  a  ")])?, s("a  "));
        assert_eq!(eval("rtrim", vec![s("  a  ")])?, s("  a"));
        Ok(())
    }

    #[test]
    fn test_substring() -> anyhow::Result<()> {
        assert_eq!(eval("substring", vec![s("hello"), ExprValue::from(2)])?, s("ello"));
        assert_eq!(
            eval("substring", vec![s("hello"), ExprValue::from(2), ExprValue::from(3)])?,
            s("ell")
        );
        assert_eq!(eval("substring", vec![s("hello"), ExprValue::from(-3)])?, s("llo"));
        assert_eq!(eval("substring", vec![s("hello"), ExprValue::from(0)])?, s(""));
        assert_eq!(eval("substring", vec![s("hello"), ExprValue::from(9)])?, s(""));
        Ok(())
    }

    #[test]
    fn test_left_right() -> anyhow::Result<()> {
        assert_eq!(eval("left", vec![s("hello"), ExprValue::from(2)])?, s("he"));
        assert_eq!(eval("right", vec![s("hello"), ExprValue::from(2)])?, s("lo"));
        assert_eq!(eval("right", vec![s("hi"), ExprValue::from(5)])?, s("hi"));
        Ok(())
    }

    #[test]
    fn test_locate_and_strcmp() -> anyhow::Result<()> {
        assert_eq!(eval("locate", vec![s("bar"), s("foobarbar")])?, ExprValue::from(4));
        assert_eq!(
            eval("locate", vec![s("bar"), s("foobarbar"), ExprValue::from(5)])?,
            ExprValue::from(7)
        );
        assert_eq!(eval("locate", vec![s("baz"), s("foobar")])?, ExprValue::from(0));
        assert_eq!(eval("strcmp", vec![s("a"), s("b")])?, ExprValue::from(-1));
        assert_eq!(eval("strcmp", vec![s("b"), s("b")])?, ExprValue::from(0));
        Ok(())
    }

    #[test]
    fn test_misc() -> anyhow::Result<()> {
        assert_eq!(eval("length", vec![s("abc")])?, ExprValue::from(3));
        assert_eq!(eval("concat", vec![s("a"), s("b")])?, s("ab"));
        assert_eq!(eval("ascii", vec![s("A")])?, ExprValue::from(65));
        assert_eq!(eval("replace", vec![s("aXbX"), s("X"), s("-")])?, s("a-b-"));
        assert_eq!(eval("upper", vec![ExprValue::Null])?, ExprValue::Null);
        Ok(())
    }
}
