//! Running operations end to end: compile, send, decode.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode, Uri};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::descriptor_cache::TypeDescriptorCache;
use crate::document_writer::DocumentStyle;
use crate::error::{BoxError, Error, OptionError, TransportStatusError};
use crate::materializer::materialize;
use crate::query_compiler::{OperationKind, QueryCompiler};
use crate::response::{aggregate, ResponseEnvelope};
use crate::schema::GraphQLObject;
use crate::transport::{ReqwestTransport, Transport};
use crate::variables::Variables;

type ApplyFn = dyn Fn(&mut http::Request<Vec<u8>>) -> Result<(), BoxError> + Send + Sync;

/// A hook that edits the outgoing HTTP request before it is sent.
#[derive(Clone)]
pub struct RequestOption {
    apply: Arc<ApplyFn>,
}

impl RequestOption {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(&mut http::Request<Vec<u8>>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        RequestOption { apply: Arc::new(apply) }
    }

    /// Sets a header, replacing any previous value. Invalid names or values
    /// fail when the option is applied.
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        RequestOption::new(move |request| {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let value = HeaderValue::from_str(&value)?;
            request.headers_mut().insert(name, value);
            Ok(())
        })
    }

    pub fn bearer_auth(token: impl Into<String>) -> Self {
        let token = token.into();
        RequestOption::new(move |request| {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
            Ok(())
        })
    }

    fn apply(&self, request: &mut http::Request<Vec<u8>>) -> Result<(), OptionError> {
        (self.apply)(request).map_err(|source| OptionError { source })
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOption").finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "no_variables")]
    variables: &'a Variables,
}

fn no_variables(variables: &&Variables) -> bool {
    variables.is_empty()
}

pub struct ClientBuilder {
    endpoint: String,
    transport: Option<Arc<dyn Transport>>,
    options: Vec<RequestOption>,
    cache: Option<Arc<TypeDescriptorCache>>,
    style: DocumentStyle,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        ClientBuilder {
            endpoint: endpoint.into(),
            transport: None,
            options: Vec::new(),
            cache: None,
            style: DocumentStyle::default(),
            timeout: None,
        }
    }

    /// Replaces the default reqwest transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Appends an option applied to every request, before per call options.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.option(RequestOption::header(name, value))
    }

    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.option(RequestOption::bearer_auth(token))
    }

    /// Shares a descriptor cache between clients.
    pub fn cache(mut self, cache: Arc<TypeDescriptorCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn style(mut self, style: DocumentStyle) -> Self {
        self.style = style;
        self
    }

    /// Request timeout of the default transport. Ignored with a custom one.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        let endpoint: Uri = self.endpoint.parse().map_err(Error::InvalidEndpoint)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                let client = builder.build().map_err(|error| Error::Transport(error.into()))?;
                Arc::new(ReqwestTransport::with_client(client))
            }
        };

        Ok(Client {
            endpoint,
            transport,
            options: self.options,
            cache: self.cache.unwrap_or_default(),
            style: self.style,
        })
    }
}

/// A GraphQL client bound to one endpoint.
///
/// Cloning is cheap; clones share the transport and the descriptor cache.
///
/// ```ignore
/// let client = Client::builder("https://api.github.com/graphql")
///     .bearer_auth(token)
///     .build()?;
///
/// let mut query = ViewerQuery::default();
/// client.query(&mut query, &Variables::new().with("n", 5)?).await?;
/// ```
#[derive(Clone)]
pub struct Client {
    endpoint: Uri,
    transport: Arc<dyn Transport>,
    options: Vec<RequestOption>,
    cache: Arc<TypeDescriptorCache>,
    style: DocumentStyle,
}

impl Client {
    pub fn new(endpoint: impl Into<String>) -> Result<Client, Error> {
        Client::builder(endpoint).build()
    }

    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Client, Error> {
        config.to_builder().build()
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    pub fn cache(&self) -> &Arc<TypeDescriptorCache> {
        &self.cache
    }

    pub async fn query<T: GraphQLObject>(&self, target: &mut T, variables: &Variables) -> Result<(), Error> {
        self.execute(OperationKind::Query, target, variables, &[], &CancellationToken::new())
            .await
    }

    pub async fn mutate<T: GraphQLObject>(&self, target: &mut T, variables: &Variables) -> Result<(), Error> {
        self.execute(OperationKind::Mutation, target, variables, &[], &CancellationToken::new())
            .await
    }

    /// Compiles the operation for `T`, sends it and fills `target` from the
    /// response.
    ///
    /// Data is written into `target` even when the response also carries
    /// errors; those are then returned as [`Error::Protocol`]. Cancelling
    /// `cancel` drops the in-flight request and returns [`Error::Cancelled`].
    pub async fn execute<T: GraphQLObject>(
        &self,
        kind: OperationKind,
        target: &mut T,
        variables: &Variables,
        options: &[RequestOption],
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let descriptor = self.cache.resolve::<T>()?;
        let document = QueryCompiler::new(&self.cache, &self.style).compile(kind, &descriptor, variables)?;
        debug!(%kind, %document, "compiled operation");

        let body = serde_json::to_vec(&RequestBody {
            query: &document,
            variables,
        })
        .map_err(Error::Encode)?;
        let mut request = http::Request::new(body);
        *request.method_mut() = Method::POST;
        *request.uri_mut() = self.endpoint.clone();
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for option in self.options.iter().chain(options) {
            option.apply(&mut request)?;
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = self.transport.send(request) => response.map_err(Error::Transport)?,
        };
        let (parts, body) = response.into_parts();
        debug!(status = %parts.status, "received response");
        if parts.status != StatusCode::OK {
            return Err(TransportStatusError {
                status: parts.status,
                body,
            }
            .into());
        }

        let envelope = ResponseEnvelope::from_slice(&body)?;
        let has_data = envelope.data.is_some();
        if let Some(data) = &envelope.data {
            materialize(&self.cache, data, target)?;
        }
        match aggregate(envelope.errors) {
            Some(errors) => {
                if has_data {
                    warn!(count = errors.errors().len(), first = %errors, "response carried errors alongside data");
                }
                Err(errors.into())
            }
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("options", &self.options.len())
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}
