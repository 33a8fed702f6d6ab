/// Wraps an `async fn` into the plain function pointer the handler maps expect.
#[macro_export]
macro_rules! handler_func {
    ($func:expr $(,)?) => {
        |ctx| Box::pin($func(ctx))
    };
}
