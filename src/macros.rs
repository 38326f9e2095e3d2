//! Macros for declaring phase enums.

/// Generate a `State` implementation for a plain enum.
///
/// Every variant becomes a phase whose name is the variant identifier.
/// Variants listed under `final:` end an attempt; those under `error:`
/// mark a failed one.
///
/// # Example
///
/// ```
/// use nexus_sso::state_enum;
/// use nexus_sso::core::State;
///
/// state_enum! {
///     pub enum Handshake {
///         Dialing,
///         Waiting,
///         Done,
///         Broken,
///     }
///     final: [Done, Broken]
///     error: [Broken]
/// }
///
/// assert_eq!(Handshake::Waiting.name(), "Waiting");
/// assert!(Handshake::Broken.is_error());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    _ => false,
                }
            }
        }
    };
}
