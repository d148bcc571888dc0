//! Document type catalogue.
//!
//! The envelope carries the type as a free-form `Type` attribute; only the
//! tags listed here are accepted by the service.

use std::fmt;

/// Closed set of document types the service ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Lp1f,
    Lp1h,
    Lp2,
    Lpa002,
    Lpa114,
    Lpa115,
    Lpa116,
    Lpa117,
    Lpa120,
    LpaPa,
    LpaPw,
    Lpc,
    Ep2pg,
    Epa,
    Copord,
    Correspondence,
    SupCorrespondence,
    DepReports,
    DepCorres,
    FinDocs,
}

/// Which kind of case a document asks the case service to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseCategory {
    Lpa,
    Epa,
    /// Court orders attach to a case number supplied in the envelope.
    Order,
}

impl DocumentType {
    pub const ALL: [DocumentType; 20] = [
        DocumentType::Lp1f,
        DocumentType::Lp1h,
        DocumentType::Lp2,
        DocumentType::Lpa002,
        DocumentType::Lpa114,
        DocumentType::Lpa115,
        DocumentType::Lpa116,
        DocumentType::Lpa117,
        DocumentType::Lpa120,
        DocumentType::LpaPa,
        DocumentType::LpaPw,
        DocumentType::Lpc,
        DocumentType::Ep2pg,
        DocumentType::Epa,
        DocumentType::Copord,
        DocumentType::Correspondence,
        DocumentType::SupCorrespondence,
        DocumentType::DepReports,
        DocumentType::DepCorres,
        DocumentType::FinDocs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Lp1f => "LP1F",
            DocumentType::Lp1h => "LP1H",
            DocumentType::Lp2 => "LP2",
            DocumentType::Lpa002 => "LPA002",
            DocumentType::Lpa114 => "LPA114",
            DocumentType::Lpa115 => "LPA115",
            DocumentType::Lpa116 => "LPA116",
            DocumentType::Lpa117 => "LPA117",
            DocumentType::Lpa120 => "LPA120",
            DocumentType::LpaPa => "LPA-PA",
            DocumentType::LpaPw => "LPA-PW",
            DocumentType::Lpc => "LPC",
            DocumentType::Ep2pg => "EP2PG",
            DocumentType::Epa => "EPA",
            DocumentType::Copord => "COPORD",
            DocumentType::Correspondence => "Correspondence",
            DocumentType::SupCorrespondence => "SupCorrespondence",
            DocumentType::DepReports => "DEPREPORTS",
            DocumentType::DepCorres => "DEPCORRES",
            DocumentType::FinDocs => "FINDOCS",
        }
    }

    /// Look up a tag exactly as it appears in the envelope. Tags are case sensitive.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == tag)
    }

    pub fn case_category(self) -> Option<CaseCategory> {
        match self {
            DocumentType::Lpa002 | DocumentType::Lp1f | DocumentType::Lp1h | DocumentType::Lp2 => {
                Some(CaseCategory::Lpa)
            }
            DocumentType::Ep2pg | DocumentType::Epa => Some(CaseCategory::Epa),
            DocumentType::Copord => Some(CaseCategory::Order),
            _ => None,
        }
    }

    /// True for types whose presence means the set opens a brand new case.
    ///
    /// Court orders are excluded: they need an existing case number.
    pub fn creates_case(self) -> bool {
        matches!(
            self.case_category(),
            Some(CaseCategory::Lpa) | Some(CaseCategory::Epa)
        )
    }

    /// Types that need downstream data extraction after ingest.
    pub fn is_extraction_eligible(self) -> bool {
        matches!(
            self,
            DocumentType::Ep2pg
                | DocumentType::Lp1f
                | DocumentType::Lp1h
                | DocumentType::Lp2
                | DocumentType::Lpc
        )
    }

    /// Document type as the case service names it. Supervision types are
    /// renamed; everything else is sent as tagged.
    pub fn case_service_type(self) -> &'static str {
        match self {
            DocumentType::FinDocs => "Report - Financial evidence",
            DocumentType::DepReports => "Report - General",
            DocumentType::DepCorres => "Report",
            DocumentType::SupCorrespondence => "Correspondence",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CaseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseCategory::Lpa => "lpa",
            CaseCategory::Epa => "epa",
            CaseCategory::Order => "order",
        }
    }
}
