//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    InputValue, ParseScalarResult, ParseScalarValue, ScalarToken, ScalarValue,
    Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute of string scalars
/// wrapping a validated `D`omain type.
///
/// Uses [`FromStr`]/[`Display`] impls of the `D`omain type, so the validation
/// rules are the ones of the `D`omain type itself.
///
/// Target type must implement [`From`] and [`AsRef`] for the `D`omain type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Validated<D>(PhantomData<D>);

impl<D> Validated<D> {
    /// Converts the target type into a string scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        D: fmt::Display,
        T: AsRef<D>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from a string scalar [`InputValue`].
    ///
    /// # Errors
    ///
    /// If the input value is not a string, or it isn't a valid `D`omain
    /// value.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        D: FromStr,
        D::Err: fmt::Display,
        T: From<D>,
        S: ScalarValue,
    {
        let s = input
            .as_string_value()
            .ok_or_else(|| format!("Expected string input, found: {input}"))?;
        s.parse::<D>()
            .map(T::from)
            .map_err(|e| format!("Cannot parse \"{s}\": {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a [`String`].
    ///
    /// # Errors
    ///
    /// If the token cannot be parsed as a [`String`].
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue};
    use service::domain::member;

    use super::Validated;

    #[derive(Debug, PartialEq)]
    struct Username(member::Username);

    impl From<member::Username> for Username {
        fn from(u: member::Username) -> Self {
            Self(u)
        }
    }

    impl AsRef<member::Username> for Username {
        fn as_ref(&self) -> &member::Username {
            &self.0
        }
    }

    #[test]
    fn parses_valid_input() {
        let input =
            InputValue::<DefaultScalarValue>::scalar("member1".to_owned());

        let parsed: Username =
            Validated::<member::Username>::from_input(&input).unwrap();

        assert_eq!(AsRef::<str>::as_ref(&parsed.0), "member1");
        assert_eq!(
            Validated::<member::Username>::to_output::<_, DefaultScalarValue>(
                &parsed,
            )
            .as_string_value(),
            Some("member1"),
        );
    }

    #[test]
    fn rejects_invalid_input() {
        let blank = InputValue::<DefaultScalarValue>::scalar(" ".to_owned());
        let number = InputValue::<DefaultScalarValue>::scalar(42);

        assert!(
            Validated::<member::Username>::from_input::<Username, _>(&blank)
                .is_err()
        );
        assert!(
            Validated::<member::Username>::from_input::<Username, _>(&number)
                .is_err()
        );
    }
}
