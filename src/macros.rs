//! Convenience macros for building contexts and per-level log methods.

/// Build a [`Context`](crate::Context) from `key => value` pairs.
///
/// Values accept anything convertible into
/// [`ContextValue`](crate::ContextValue), including nested `context!`
/// invocations.
///
/// ```
/// use gelf_socket::context;
///
/// let ctx = context! {
///     "user" => context! { "id" => 7, "name" => "ada" },
///     "retry" => true,
/// };
/// assert_eq!(ctx.len(), 2);
/// ```
#[macro_export]
macro_rules! context {
    () => {
        $crate::Context::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Context::new()$(.with($key, $value))+
    };
}

/// Generate `GelfSocket` methods that log at a fixed level.
macro_rules! level_methods {
    ($($(#[$meta:meta])* $name:ident => $level:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(
                &mut self,
                message: &str,
                context: $crate::Context,
            ) -> Result<&mut Self, $crate::GelfError> {
                self.log($crate::GelfLevel::$level, message, context)
            }
        )+
    };
}

pub(crate) use level_methods;
