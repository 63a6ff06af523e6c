//! Shared server state

use std::sync::Arc;

use mcol_application::IngestionService;
use mcol_domain::error::Result;
use mcol_infrastructure::crypto::PayloadDecryptor;
use mcol_infrastructure::net::TrustedSubnet;

use crate::http::ListingPage;

/// State managed by Rocket and read by the request guards
pub struct ServerState {
    /// Metric ingestion use case
    pub ingestion: Arc<IngestionService>,
    /// Writers must report an address inside this subnet
    pub trusted: Option<TrustedSubnet>,
    /// Private key for `64base` bodies
    pub decryptor: Option<PayloadDecryptor>,
    /// Rendered by `GET /`
    pub listing: ListingPage,
}

impl ServerState {
    /// State with no subnet restriction and no private key
    pub fn new(ingestion: Arc<IngestionService>) -> Result<Self> {
        Ok(Self {
            ingestion,
            trusted: None,
            decryptor: None,
            listing: ListingPage::new()?,
        })
    }

    #[must_use]
    pub fn with_trusted_subnet(mut self, trusted: Option<TrustedSubnet>) -> Self {
        self.trusted = trusted;
        self
    }

    #[must_use]
    pub fn with_decryptor(mut self, decryptor: Option<PayloadDecryptor>) -> Self {
        self.decryptor = decryptor;
        self
    }

    /// Check a writer's self-reported address against the trusted subnet
    pub fn authorize(&self, caller: Option<&str>) -> Result<()> {
        match &self.trusted {
            Some(subnet) => subnet.check(caller),
            None => Ok(()),
        }
    }
}
