/// The free-text address parts of a user that are relevant for locating them.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressFragments {
    pub neighborhood : Option<String>,
    pub city         : Option<String>,
    pub state        : Option<String>,
}

fn non_blank(part: &Option<String>) -> Option<&str> {
    part.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl AddressFragments {
    pub fn is_empty(&self) -> bool {
        self.neighborhood().is_none() && self.city().is_none() && self.state().is_none()
    }

    pub fn neighborhood(&self) -> Option<&str> {
        non_blank(&self.neighborhood)
    }

    pub fn city(&self) -> Option<&str> {
        non_blank(&self.city)
    }

    pub fn state(&self) -> Option<&str> {
        non_blank(&self.state)
    }

    /// Human readable location label, e.g. `"Centro, Curitiba"`.
    ///
    /// Returns `None` if neither a neighborhood nor a city is available.
    /// The state is never part of the label.
    pub fn location_label(&self) -> Option<String> {
        match (self.neighborhood(), self.city()) {
            (Some(n), Some(c)) => Some(format!("{n}, {c}")),
            (Some(n), None) => Some(n.to_owned()),
            (None, Some(c)) => Some(c.to_owned()),
            (None, None) => None,
        }
    }
}
