use crate::{Context, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Signer is the main struct used to sign the request.
///
/// It loads the credential once through its provider and keeps it cached
/// until it is no longer valid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the context used by this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Signing request.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let credential = self.credential.lock().expect("lock poisoned").clone();
        let credential = if credential.is_valid() {
            credential
        } else {
            debug!("no valid cached credential, loading from provider");
            let loaded = self.loader.provide_credential(&self.ctx).await?;
            *self.credential.lock().expect("lock poisoned") = loaded.clone();
            loaded
        };

        self.builder
            .sign_request(&self.ctx, req, credential.as_ref(), expires_in)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct TestCredential(String);

    impl SigningCredential for TestCredential {
        fn is_valid(&self) -> bool {
            !self.0.is_empty()
        }
    }

    #[derive(Debug, Default)]
    struct CountingLoader {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ProvideCredential for CountingLoader {
        type Credential = TestCredential;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(TestCredential("token".to_string())))
        }
    }

    #[derive(Debug)]
    struct HeaderSigner;

    #[async_trait::async_trait]
    impl SignRequest for HeaderSigner {
        type Credential = TestCredential;

        async fn sign_request(
            &self,
            _: &Context,
            req: &mut http::request::Parts,
            credential: Option<&Self::Credential>,
            _: Option<Duration>,
        ) -> Result<()> {
            let cred = credential.expect("credential must be loaded");
            req.headers.insert("x-test-token", cred.0.parse()?);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_signer_caches_credential() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            calls: calls.clone(),
        };
        let signer = Signer::new(Context::new(), loader, HeaderSigner);

        for _ in 0..3 {
            let mut parts = http::Request::get("https://example.com")
                .body(())
                .unwrap()
                .into_parts()
                .0;
            signer.sign(&mut parts, None).await.unwrap();
            assert_eq!(parts.headers["x-test-token"], "token");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
