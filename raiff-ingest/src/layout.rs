//! Crop regions per (currency, page role) and the per-page extraction plan.
//!
//! The coordinates are reverse-engineered from the Raiffeisen statement
//! template (PDF points: top, left, bottom, right). They only hold for that
//! template and must be re-measured if the bank changes its layout.

use raiff_core::Currency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ExtractError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Area {
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self { top, left, bottom, right }
    }

    /// `top,left,bottom,right` as tabula's `--area` expects it
    pub fn to_tabula_arg(&self) -> String {
        format!("{},{},{},{}", self.top, self.left, self.bottom, self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageRole {
    First,
    Middle,
    Last,
}

const FIRST_PAGE: Area = Area::new(366.818, 10.71, 701.123, 594.405);
const MIDDLE_PAGE: Area = Area::new(53.933, 19.0, 693.473, 588.16);
const LAST_PAGE_EUR_USD: Area = Area::new(14.918, 12.24, 636.098, 595.17);
const LAST_PAGE_RSD: Area = Area::new(56.993, 11.475, 702.653, 596.7);

/// One override line in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub currency: Currency,
    pub role: PageRole,
    pub area: Area,
}

/// Crop areas keyed by (currency, page role). Deserialized entries are
/// applied on top of the built-in template, so a config only has to list
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<LayoutEntry>", into = "Vec<LayoutEntry>")]
pub struct LayoutTable {
    areas: BTreeMap<(Currency, PageRole), Area>,
}

impl LayoutTable {
    pub fn raiffeisen() -> Self {
        let mut areas = BTreeMap::new();
        for currency in Currency::ALL {
            areas.insert((currency, PageRole::First), FIRST_PAGE);
            areas.insert((currency, PageRole::Middle), MIDDLE_PAGE);
            let last = match currency {
                Currency::Rsd => LAST_PAGE_RSD,
                Currency::Eur | Currency::Usd => LAST_PAGE_EUR_USD,
            };
            areas.insert((currency, PageRole::Last), last);
        }
        Self { areas }
    }

    pub fn area(&self, currency: Currency, role: PageRole) -> Option<Area> {
        self.areas.get(&(currency, role)).copied()
    }

    pub fn set(&mut self, currency: Currency, role: PageRole, area: Area) {
        self.areas.insert((currency, role), area);
    }

    fn require(&self, currency: Currency, role: PageRole) -> Result<Area, ExtractError> {
        self.area(currency, role)
            .ok_or(ExtractError::MissingLayout { currency, role })
    }
}

impl Default for LayoutTable {
    fn default() -> Self {
        Self::raiffeisen()
    }
}

impl From<Vec<LayoutEntry>> for LayoutTable {
    fn from(entries: Vec<LayoutEntry>) -> Self {
        let mut table = Self::raiffeisen();
        for e in entries {
            table.set(e.currency, e.role, e.area);
        }
        table
    }
}

impl From<LayoutTable> for Vec<LayoutEntry> {
    fn from(table: LayoutTable) -> Self {
        table
            .areas
            .into_iter()
            .map(|((currency, role), area)| LayoutEntry { currency, role, area })
            .collect()
    }
}

/// Extraction job for one page. `area: None` means full-page extraction
/// with tabula guessing the table position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageJob {
    pub page: u32,
    pub role: PageRole,
    pub area: Option<Area>,
}

/// Plan one job per page: first page and middle pages use their crop, the
/// last page is read whole unless `crop_last_page` is set.
pub fn plan_pages(
    page_count: u32,
    currency: Currency,
    layout: &LayoutTable,
    crop_last_page: bool,
) -> Result<Vec<PageJob>, ExtractError> {
    if page_count == 0 {
        return Err(ExtractError::EmptyDocument);
    }

    let mut jobs = vec![PageJob {
        page: 1,
        role: PageRole::First,
        area: Some(layout.require(currency, PageRole::First)?),
    }];
    if page_count == 1 {
        return Ok(jobs);
    }

    let middle = layout.require(currency, PageRole::Middle)?;
    for page in 2..page_count {
        jobs.push(PageJob {
            page,
            role: PageRole::Middle,
            area: Some(middle),
        });
    }

    let last_area = if crop_last_page {
        Some(layout.require(currency, PageRole::Last)?)
    } else {
        None
    };
    jobs.push(PageJob {
        page: page_count,
        role: PageRole::Last,
        area: last_area,
    });

    Ok(jobs)
}
