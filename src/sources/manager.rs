use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{
    identifier::extract_video_id,
    invidious::InvidiousProvider,
    piped::PipedProvider,
    plugin::{BoxedProvider, StreamProvider, TrackResolver},
    ytdlp::YtDlpProvider,
};
use crate::{
    common::{errors::RadioError, http::HttpClient, types::AnyResult, types::VideoId},
    configs::SourcesConfig,
};

/// Ordered list of resolution strategies. The first one to produce a URL
/// within its time bound wins.
pub struct SourceManager {
    providers: Vec<BoxedProvider>,
}

impl SourceManager {
    pub fn new(config: &SourcesConfig) -> AnyResult<Self> {
        let mut providers: Vec<BoxedProvider> = Vec::new();

        macro_rules! register_provider {
            ($provider:expr) => {{
                let provider = $provider;
                debug!("Registered stream provider: {}", provider.name());
                providers.push(Box::new(provider));
            }};
        }

        if config.ytdlp.enabled {
            register_provider!(YtDlpProvider::new(&config.ytdlp));
        }

        if config.piped.enabled && !config.piped.instances.is_empty() {
            let client = HttpClient::with_timeout(config.piped.timeout())?;
            for instance in &config.piped.instances {
                register_provider!(PipedProvider::new(
                    instance,
                    client.clone(),
                    config.piped.timeout()
                ));
            }
        }

        if config.invidious.enabled && !config.invidious.instances.is_empty() {
            let client = HttpClient::with_timeout(config.invidious.timeout())?;
            for instance in &config.invidious.instances {
                register_provider!(InvidiousProvider::new(
                    instance,
                    client.clone(),
                    config.invidious.timeout()
                ));
            }
        }

        if providers.is_empty() {
            warn!("No stream providers enabled, every track will fail to resolve");
        } else {
            info!("Loaded {} stream providers", providers.len());
        }

        Ok(Self { providers })
    }

    pub fn with_providers(providers: Vec<BoxedProvider>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Tries each provider in order, each bounded by its own timeout.
    pub async fn resolve_id(&self, video_id: &VideoId) -> Result<String, RadioError> {
        info!("Getting audio stream for: {}", video_id);

        for provider in &self.providers {
            debug!("Trying {} for {}", provider.name(), video_id);
            match tokio::time::timeout(provider.timeout(), provider.stream_url(video_id)).await {
                Ok(Ok(url)) => {
                    info!("Got audio stream via {}", provider.name());
                    return Ok(url);
                }
                Ok(Err(e)) => warn!("{} failed for {}: {}", provider.name(), video_id, e),
                Err(_) => warn!(
                    "{} timed out after {:?} for {}",
                    provider.name(),
                    provider.timeout(),
                    video_id
                ),
            }
        }

        let err = RadioError::ResolutionFailure {
            reference: video_id.to_string(),
            attempts: self.providers.len(),
        };
        error!("{}", err);
        Err(err)
    }
}

#[async_trait]
impl TrackResolver for SourceManager {
    async fn resolve(&self, reference: &str) -> Result<String, RadioError> {
        let video_id = extract_video_id(reference)
            .ok_or_else(|| RadioError::InvalidReference(reference.to_string()))?;
        self.resolve_id(&video_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::*;

    enum Behaviour {
        Fail,
        Succeed(&'static str),
        Hang,
    }

    struct FakeProvider {
        name: String,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    fn fake(name: &str, behaviour: Behaviour, calls: &Arc<AtomicUsize>) -> BoxedProvider {
        Box::new(FakeProvider {
            name: name.to_string(),
            behaviour,
            calls: calls.clone(),
        })
    }

    #[async_trait]
    impl StreamProvider for FakeProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(10)
        }

        async fn stream_url(&self, video_id: &VideoId) -> AnyResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Fail => Err("boom".into()),
                Behaviour::Succeed(base) => Ok(format!("{}/{}", base, video_id)),
                Behaviour::Hang => Ok(std::future::pending::<String>().await),
            }
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = SourceManager::with_providers(vec![
            fake("a", Behaviour::Fail, &calls),
            fake("b", Behaviour::Succeed("https://b"), &calls),
            fake("c", Behaviour::Succeed("https://c"), &calls),
        ]);

        let url = manager.resolve("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
        assert_eq!(url, "https://b/dQw4w9WgXcQ");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_provider_falls_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = SourceManager::with_providers(vec![
            fake("slow", Behaviour::Hang, &calls),
            fake("fast", Behaviour::Succeed("https://fast"), &calls),
        ]);

        let url = manager.resolve("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(url, "https://fast/dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_all_failing_reports_resolution_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager = SourceManager::with_providers(vec![
            fake("a", Behaviour::Fail, &calls),
            fake("b", Behaviour::Fail, &calls),
        ]);

        match manager.resolve("dQw4w9WgXcQ").await {
            Err(RadioError::ResolutionFailure { reference, attempts }) => {
                assert_eq!(reference, "dQw4w9WgXcQ");
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_reference_skips_providers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let manager =
            SourceManager::with_providers(vec![fake("a", Behaviour::Succeed("x"), &calls)]);

        assert!(matches!(
            manager.resolve("not a video").await,
            Err(RadioError::InvalidReference(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registration_order() {
        let manager = SourceManager::new(&SourcesConfig::default()).unwrap();
        let names = manager.provider_names();
        assert_eq!(names[0], "yt-dlp");
        assert!(names[1].starts_with("piped:"));
        assert!(names.last().unwrap().starts_with("invidious:"));
        assert_eq!(names.len(), 1 + 3 + 4);
    }
}
