//! The lookup element: the catalogue's unit of service.
//!
//! An element is either a [`StandardElement`], built by correlating an
//! administrator-supplied zone with its template, or a
//! [`SyntheticRootElement`], used when no explicit `0.0.0.0/0` zone was
//! configured. Both variants expose the same capability set through the
//! [`LookupElement`] enum.

use crate::ip::IpNet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardElement {
    pub network: IpNet,
    pub pac_filename: String,
    pub rendered_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticRootElement {
    pub rendered_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupElement {
    Standard(StandardElement),
    SyntheticRoot(SyntheticRootElement),
}

impl LookupElement {
    pub fn network(&self) -> IpNet {
        match self {
            LookupElement::Standard(e) => e.network,
            LookupElement::SyntheticRoot(_) => IpNet::root(),
        }
    }

    pub fn rendered_text(&self) -> &str {
        match self {
            LookupElement::Standard(e) => &e.rendered_text,
            LookupElement::SyntheticRoot(e) => &e.rendered_text,
        }
    }

    /// The PAC filename backing this element, or `None` for a synthetic
    /// root that has no on-disk default.
    pub fn filename(&self) -> Option<&str> {
        match self {
            LookupElement::Standard(e) => Some(&e.pac_filename),
            LookupElement::SyntheticRoot(_) => None,
        }
    }

    pub fn is_subnet_of(&self, other: &LookupElement) -> bool {
        self.network().is_subnet_of(&other.network())
    }

    pub fn is_identical_net(&self, other: &LookupElement) -> bool {
        self.network().is_identical(&other.network())
    }

    /// Two elements serve the same content iff they share a filename;
    /// a synthetic root never matches a standard element.
    pub fn is_identical_pac(&self, other: &LookupElement) -> bool {
        match (self.filename(), other.filename()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn synthetic_root(rendered_text: String) -> Self {
        LookupElement::SyntheticRoot(SyntheticRootElement { rendered_text })
    }

    pub fn standard(network: IpNet, pac_filename: String, rendered_text: String) -> Self {
        LookupElement::Standard(StandardElement {
            network,
            pac_filename,
            rendered_text,
        })
    }
}
