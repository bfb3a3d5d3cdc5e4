//! Elemental composition of a simulated structure.
//!
//! Compositions are keyed by element symbol in a `BTreeMap`, so every
//! rendered formula lists elements alphabetically no matter how the sites
//! were ordered in the structure descriptor.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::domain::errors::{DomainError, DomainResult};

/// Amounts closer than this to an integer are treated as integers.
const AMOUNT_TOLERANCE: f64 = 1e-8;

/// Elemental composition: element symbol to (possibly fractional) amount.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    amounts: BTreeMap<String, f64>,
}

impl Composition {
    /// Build a composition from `(element, amount)` pairs.
    ///
    /// Repeated elements are summed. Amounts must be finite and positive.
    pub fn from_amounts<I, S>(amounts: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map: BTreeMap<String, f64> = BTreeMap::new();
        for (element, amount) in amounts {
            let element = element.into();
            if element.is_empty() {
                return Err(DomainError::InvalidComposition(
                    "element symbol cannot be empty".to_string(),
                ));
            }
            if !amount.is_finite() || amount <= 0.0 {
                return Err(DomainError::InvalidComposition(format!(
                    "amount for {element} must be positive, got {amount}"
                )));
            }
            *map.entry(element).or_insert(0.0) += amount;
        }

        if map.is_empty() {
            return Err(DomainError::InvalidComposition(
                "composition has no elements".to_string(),
            ));
        }

        Ok(Self { amounts: map })
    }

    /// Derive the composition of a structure descriptor.
    ///
    /// Sites are read from `sites` at the top level or from `structure.sites`.
    /// Each site lists `species` entries of `{ "element": .., "occu": .. }`;
    /// a missing occupancy counts as a fully occupied site.
    pub fn from_structure(descriptor: &Value) -> DomainResult<Self> {
        let sites = descriptor
            .get("sites")
            .or_else(|| descriptor.get("structure").and_then(|s| s.get("sites")))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                DomainError::InvalidComposition("structure has no sites array".to_string())
            })?;

        let mut amounts = Vec::new();
        for (index, site) in sites.iter().enumerate() {
            let species = site
                .get("species")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    DomainError::InvalidComposition(format!("site {index} has no species"))
                })?;

            for specie in species {
                let element = specie
                    .get("element")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        DomainError::InvalidComposition(format!(
                            "site {index} has a species without an element"
                        ))
                    })?;
                let occupancy = specie.get("occu").and_then(Value::as_f64).unwrap_or(1.0);
                amounts.push((element.to_string(), occupancy));
            }
        }

        Self::from_amounts(amounts)
    }

    /// Amount of a single element, if present.
    pub fn amount(&self, element: &str) -> Option<f64> {
        self.amounts.get(element).copied()
    }

    /// Elements in alphabetical order.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.amounts.keys().map(String::as_str)
    }

    /// Divide all amounts by their greatest common divisor.
    ///
    /// Compositions with fractional amounts are already in their reduced
    /// form and are returned unchanged.
    pub fn reduced(&self) -> Self {
        let Some(integers) = self
            .amounts
            .values()
            .map(|&amount| as_integer(amount))
            .collect::<Option<Vec<u64>>>()
        else {
            return self.clone();
        };

        let divisor = integers.iter().copied().fold(0, gcd).max(1);
        #[allow(clippy::cast_precision_loss)]
        let divisor = divisor as f64;

        Self {
            amounts: self
                .amounts
                .iter()
                .map(|(element, amount)| (element.clone(), (amount / divisor).round()))
                .collect(),
        }
    }

    /// Formula with elements in alphabetical order separated by spaces,
    /// e.g. `Fe2 O3`. Unit amounts are omitted.
    pub fn alphabetical_formula(&self) -> String {
        self.amounts
            .iter()
            .map(|(element, &amount)| format!("{element}{}", format_amount(amount)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Alphabetical formula of the reduced composition.
    pub fn reduced_alphabetical_formula(&self) -> String {
        self.reduced().alphabetical_formula()
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alphabetical_formula())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_integer(amount: f64) -> Option<u64> {
    let rounded = amount.round();
    ((amount - rounded).abs() < AMOUNT_TOLERANCE && rounded >= 1.0).then_some(rounded as u64)
}

const fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn format_amount(amount: f64) -> String {
    match as_integer(amount) {
        Some(1) => String::new(),
        Some(n) => n.to_string(),
        None => {
            let rounded = (amount * 1e8).round() / 1e8;
            format!("{rounded}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site(element: &str) -> Value {
        json!({ "species": [{ "element": element, "occu": 1.0 }], "abc": [0.0, 0.0, 0.0] })
    }

    #[test]
    fn test_reduced_formula_divides_by_gcd() {
        let comp = Composition::from_amounts([("O", 6.0), ("Fe", 4.0)]).unwrap();
        assert_eq!(comp.reduced_alphabetical_formula(), "Fe2 O3");
    }

    #[test]
    fn test_unit_amounts_are_omitted() {
        let comp = Composition::from_amounts([("Na", 4.0), ("Cl", 4.0)]).unwrap();
        assert_eq!(comp.reduced_alphabetical_formula(), "Cl Na");
    }

    #[test]
    fn test_fractional_amounts_are_not_reduced() {
        let comp = Composition::from_amounts([("Li", 0.5), ("Co", 1.0), ("O", 2.0)]).unwrap();
        assert_eq!(comp.reduced_alphabetical_formula(), "Co Li0.5 O2");
    }

    #[test]
    fn test_repeated_elements_are_summed() {
        let comp = Composition::from_amounts([("O", 1.0), ("Si", 1.0), ("O", 1.0)]).unwrap();
        assert_eq!(comp.amount("O"), Some(2.0));
        assert_eq!(comp.elements().collect::<Vec<_>>(), vec!["O", "Si"]);
    }

    #[test]
    fn test_rejects_empty_and_non_positive() {
        assert!(Composition::from_amounts(Vec::<(String, f64)>::new()).is_err());
        assert!(Composition::from_amounts([("Fe", 0.0)]).is_err());
        assert!(Composition::from_amounts([("Fe", f64::NAN)]).is_err());
    }

    #[test]
    fn test_from_structure_top_level_sites() {
        let descriptor = json!({
            "sites": [site("O"), site("Fe"), site("O"), site("Fe"), site("O")],
            "about": { "authors": [] }
        });
        let comp = Composition::from_structure(&descriptor).unwrap();
        assert_eq!(comp.reduced_alphabetical_formula(), "Fe2 O3");
    }

    #[test]
    fn test_from_structure_nested_sites_and_partial_occupancy() {
        let descriptor = json!({
            "structure": {
                "sites": [
                    { "species": [{ "element": "Li", "occu": 0.5 }, { "element": "Na", "occu": 0.5 }] },
                    { "species": [{ "element": "Cl" }] }
                ]
            }
        });
        let comp = Composition::from_structure(&descriptor).unwrap();
        assert_eq!(comp.alphabetical_formula(), "Cl Li0.5 Na0.5");
    }

    #[test]
    fn test_from_structure_without_sites_fails() {
        let err = Composition::from_structure(&json!({ "lattice": {} })).unwrap_err();
        assert!(matches!(err, DomainError::InvalidComposition(_)));
    }
}
