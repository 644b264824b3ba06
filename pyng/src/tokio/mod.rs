mod java;

use std::{sync::OnceLock, time::Duration};

use hickory_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
};

pub use self::java::{read_frame, write_packet};
use crate::Error;

/// Represents a pingable entity.
pub trait AsyncPingable {
    /// The type of response that is expected in reply to the ping.
    type Response;

    /// Ping the entity, gathering the latency and response.
    fn ping(
        self,
    ) -> impl std::future::Future<Output = Result<(Duration, Self::Response), Error>> + Send;
}

/// Retrieve the status of a given Minecraft server using a `AsyncPingable` configuration.
///
///
/// Returns `(latency, response)` where response is a response type of the `AsyncPingable`
/// configuration and latency is the round trip of a ping packet.
///
/// # Examples
///
/// Ping a Java Server with a three second timeout:
///
/// ```no_run
/// # async {
/// use std::time::Duration;
///
/// let (latency, response) = pyng::tokio::get_status(pyng::Java {
///     server_address: "mc.hypixel.net".into(),
///     timeout: Some(Duration::from_secs(3)),
/// }).await?;
/// println!("{} in {:.2}ms", response.version.name, latency.as_secs_f64() * 1000.0);
/// # Ok::<(), pyng::Error>(())
/// # };
/// ```
///
/// # Errors
/// If the server status cannot be recieved
pub async fn get_status<P: AsyncPingable + Send>(
    pingable: P,
) -> Result<(Duration, P::Response), Error> {
    pingable.ping().await
}

fn new_resolver() -> TokioAsyncResolver {
    let config = ResolverConfig::cloudflare();
    let mut opts = ResolverOpts::default();
    opts.cache_size = 64;
    opts.attempts = 3;
    TokioAsyncResolver::tokio(config, opts)
}

pub fn resolver() -> &'static TokioAsyncResolver {
    static RESOLVER: OnceLock<TokioAsyncResolver> = OnceLock::new();
    RESOLVER.get_or_init(new_resolver)
}
