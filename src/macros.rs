//! Option constructors that name only the fields a caller changes.
//!
//! Struct literals break as soon as a field is added; these expand to struct update syntax
//! over `Default`, so call sites keep compiling.

/// Build [`crate::Options`], overriding the listed fields.
///
/// ```rust
/// use axiom::options::DuplicateKeyPolicy;
///
/// let options = axiom::options! {
///     duplicate_keys: DuplicateKeyPolicy::LastWins,
///     strict_booleans: true,
/// };
/// assert!(options.strict_booleans);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {
        $crate::Options {
            $( $field: $value, )*
            ..::core::default::Default::default()
        }
    };
}

/// Build [`crate::SerializerOptions`], overriding the listed fields.
///
/// ```rust
/// let opts = axiom::serializer_options! {
///     indent_step: 4,
///     quote_all: true,
/// };
/// assert_eq!(opts.indent_step, 4);
/// ```
#[macro_export]
macro_rules! serializer_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {
        $crate::SerializerOptions {
            $( $field: $value, )*
            ..::core::default::Default::default()
        }
    };
}

/// Short form of [`serializer_options!`].
#[macro_export]
macro_rules! ser_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {
        $crate::serializer_options! { $( $field : $value ),* }
    };
}
