//! Macros for ergonomic identifier declarations.

/// Declare a fieldless enum usable as a state or trigger identifier.
///
/// The enum derives everything [`crate::core::StateId`] and
/// [`crate::core::TriggerId`] need, plus `Copy`, and gains `ALL` (every
/// variant in declaration order) and `name()`.
///
/// # Example
///
/// ```
/// use hfsm::id_enum;
///
/// id_enum! {
///     pub enum Mode {
///         Idle,
///         Busy,
///     }
/// }
///
/// assert_eq!(Mode::ALL, &[Mode::Idle, Mode::Busy]);
/// assert_eq!(Mode::Busy.name(), "Busy");
/// ```
#[macro_export]
macro_rules! id_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
