use crate::core::value::Value;

pub type Validator = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Run a list of validators against `value`, returning the first error.
pub fn run_validators(validators: &[Validator], value: &Value) -> Result<(), String> {
    for validator in validators {
        validator(value)?;
    }
    Ok(())
}

pub fn required_text(message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value.as_text() {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(message.clone()),
    })
}

pub fn int_range(min: i64, max: i64, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match value.as_int() {
        Some(v) if (min..=max).contains(&v) => Ok(()),
        _ => Err(message.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::{int_range, required_text, run_validators};
    use crate::core::value::Value;

    #[test]
    fn required_text_rejects_blank() {
        let validators = vec![required_text("name is required")];
        assert!(run_validators(&validators, &Value::text("  ")).is_err());
        assert!(run_validators(&validators, &Value::text("Kay")).is_ok());
    }

    #[test]
    fn int_range_is_inclusive() {
        let validators = vec![int_range(0, 4, "quest id out of range")];
        assert!(run_validators(&validators, &Value::Int(4)).is_ok());
        assert_eq!(
            run_validators(&validators, &Value::Int(5)),
            Err("quest id out of range".to_string())
        );
    }
}
