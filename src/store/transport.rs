use crate::config::{ClientConfig, Verify};
use crate::error::Result;
use reqwest::blocking::Client;
use reqwest::StatusCode;

/// Carries one SOAP request to the store and returns the reply body
pub trait Transport {
    fn post(&self, soap_action: &str, envelope: String) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, soap_action: &str, envelope: String) -> Result<String> {
        (**self).post(soap_action, envelope)
    }
}

/// SOAP over HTTP(S) with basic authentication
pub struct HttpTransport {
    client: Client,
    url: String,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.agent_name.clone());

        match &config.verify {
            Verify::Enabled => {}
            Verify::Disabled => {
                log::warn!("TLS certificate verification is disabled for {}", config.service_url);
                builder = builder.danger_accept_invalid_certs(true);
            }
            Verify::CaBundle(path) => {
                let pem = std::fs::read(path)?;
                builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
            }
        }

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpTransport {
            client: builder.build()?,
            url: config.service_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn post(&self, soap_action: &str, envelope: String) -> Result<String> {
        log::debug!("POST {} ({})", self.url, soap_action);

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(envelope)
            .send()?;

        // faults arrive with status 500 and a SOAP body
        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            return Ok(response.text()?);
        }

        Ok(response.error_for_status()?.text()?)
    }
}
