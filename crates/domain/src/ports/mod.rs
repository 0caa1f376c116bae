use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub mod camera;
pub mod identity;
pub mod navigation;
pub mod notify;
pub mod store;
