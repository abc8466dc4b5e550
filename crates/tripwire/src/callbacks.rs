// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::StateChangeArgs;

/// Generates a cloneable, thread-safe wrapper around a user-provided `Fn`.
///
/// ```rust,ignore
/// define_fn_wrapper!(OnStateChange(Fn(args: StateChangeArgs<'_>)));
/// ```
///
/// The generated type has `new`, `call`, `Clone` and a `Debug` that prints the type name.
macro_rules! define_fn_wrapper {
    ($name:ident(Fn($($param_name:ident: $param_ty:ty),*) -> $return_ty:ty)) => {
        pub(crate) struct $name(std::sync::Arc<dyn Fn($($param_ty),*) -> $return_ty + Send + Sync>);

        impl $name {
            pub(crate) fn new<F>(callback: F) -> Self
            where
                F: Fn($($param_ty),*) -> $return_ty + Send + Sync + 'static,
            {
                Self(std::sync::Arc::new(callback))
            }

            pub(crate) fn call(&self, $($param_name: $param_ty),*) -> $return_ty {
                (self.0)($($param_name),*)
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                Self(std::sync::Arc::clone(&self.0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name)).finish()
            }
        }
    };

    ($name:ident(Fn($($param_name:ident: $param_ty:ty),*))) => {
        define_fn_wrapper!($name(Fn($($param_name: $param_ty),*) -> ()));
    };
}

define_fn_wrapper!(OnStateChange(Fn(args: StateChangeArgs<'_>)));
