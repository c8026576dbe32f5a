use crate::config::ExtractorConfig;
use crate::document::Document;
use crate::error::{DocumentError, MaterializeError};
use crate::fields;
use crate::fields::images::{additional_image_urls, image_records, main_image_url};
use crate::materialize::ImageFetcher;
use crate::record::{Meta, ProductRecord};
use crate::site::{affiliate_url, is_product_page, site_info};
use chrono::Utc;

/// Turns a loaded product page into a [`ProductRecord`]
pub struct ProductPageExtractor {
    config: ExtractorConfig,
    fetcher: Option<ImageFetcher>,
}

impl ProductPageExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, MaterializeError> {
        let fetcher = if config.materialize_images {
            Some(ImageFetcher::new(&config)?)
        } else {
            None
        };
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts a record from `doc`. This never fails: fields the page does
    /// not show get their defaults, and a document that cannot be read
    /// produces a record with `meta.success == false`.
    pub async fn extract<D: Document>(&self, doc: &mut D) -> ProductRecord {
        if self.config.expand {
            match doc.expand(self.config.expand_delay()).await {
                Ok(true) => ::log::debug!("Expanded \"About this item\""),
                Ok(false) => {}
                Err(e) => ::log::warn!("Could not expand product page: {}", e),
            }
        }

        match self.try_extract(&*doc).await {
            Ok(record) => record,
            Err(e) => {
                let url = doc
                    .location()
                    .map(|url| url.to_string())
                    .unwrap_or_default();
                ::log::error!("Extraction failed for {:?}: {}", url, e);
                ProductRecord::failed(url, e.to_string())
            }
        }
    }

    async fn try_extract<D: Document>(&self, doc: &D) -> Result<ProductRecord, DocumentError> {
        let url = doc.location()?;
        ::log::info!("Extracting product data from {}", url);
        if !is_product_page(doc)? {
            ::log::warn!("{} does not look like an Amazon product page", url);
        }

        let asin = fields::asin(doc)?;
        let title = fields::title(doc)?;
        let price = fields::price(doc)?;
        let rating = fields::rating(doc)?;
        let breadcrumbs = fields::breadcrumbs(doc)?;
        let site = site_info(&url);

        let main = main_image_url(doc)?;
        let seen: Vec<String> = main.iter().cloned().collect();
        let additional = additional_image_urls(doc, self.config.max_additional_images, &seen)?;
        let mut images = image_records(&title, &asin, main, additional);

        let variations = fields::variations(doc)?;
        let details = fields::details(doc)?;
        let reviews = fields::reviews(doc)?;
        let features = fields::features(doc)?;
        let description = fields::description(doc)?;
        let questions = fields::questions(doc)?;

        if let Some(fetcher) = &self.fetcher {
            fetcher.materialize_all(&mut images).await;
        }

        let mut record = ProductRecord {
            url: url.to_string(),
            asin,
            title,
            price,
            rating,
            category: breadcrumbs.first().map(|crumb| crumb.text.clone()),
            breadcrumbs,
            site,
            images,
            variations,
            details,
            features,
            description,
            reviews,
            questions,
            affiliate_url: None,
            meta: Meta {
                extraction_date: Utc::now(),
                success: true,
                error: None,
            },
        };

        if let Some(associate_id) = &self.config.associate_id {
            if record.has_asin() {
                record.affiliate_url =
                    Some(affiliate_url(&record.site, &record.asin, associate_id));
            }
        }

        ::log::info!(
            "Extracted {} ({}) with {} images",
            record.asin,
            record.title,
            record.images.len()
        );
        Ok(record)
    }
}
