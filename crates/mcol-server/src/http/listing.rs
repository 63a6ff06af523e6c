//! HTML listing of every stored metric

use mcol_domain::MetricListing;
use mcol_domain::error::{Error, Result};
use tera::{Context, Tera};

const LISTING_TEMPLATE: &str = "listing.html";

/// Tera page with a counter section and a gauge section
pub struct ListingPage {
    tera: Tera,
}

impl ListingPage {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(LISTING_TEMPLATE, include_str!("templates/listing.html"))
            .map_err(|e| Error::internal(format!("Listing template is invalid: {e}")))?;
        Ok(Self { tera })
    }

    /// Render `[name]: [value]` items, gauges with three decimals
    pub fn render(&self, listing: &MetricListing) -> Result<String> {
        let mut context = Context::new();
        context.insert("counters", &listing.counter_lines());
        context.insert("gauges", &listing.gauge_lines());
        self.tera
            .render(LISTING_TEMPLATE, &context)
            .map_err(|e| Error::internal(format!("Failed to render listing: {e}")))
    }
}
