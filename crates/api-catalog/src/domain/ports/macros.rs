//! Generates port error enums together with snake_case constructors.
//!
//! Each variant becomes a `thiserror` variant plus a constructor named after
//! it, so adapters can write `ApiSpecSourceError::timeout("...")`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( {
                    $(
                        #[doc = concat!("`", stringify!($field), "` detail.")]
                        $field : $ty
                    ),*
                } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor generation checks.
    define_port_error! {
        /// Example error used only by these tests.
        pub enum ExamplePortError {
            /// Unit variant.
            Closed => "closed",
            /// Message variant.
            Failed { message: String } => "failed: {message}",
            /// Mixed fields.
            Limited { message: String, status: u16 } => "limited: {message} ({status})",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        assert_eq!(ExamplePortError::failed("boom").to_string(), "failed: boom");
    }

    #[test]
    fn constructors_support_unit_and_mixed_variants() {
        assert_eq!(ExamplePortError::closed().to_string(), "closed");
        assert_eq!(
            ExamplePortError::limited("slow down", 429_u16).to_string(),
            "limited: slow down (429)"
        );
    }
}
