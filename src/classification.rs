use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    EqualInterval,
    Quantiles,
}

impl FromStr for Classification {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Quantiles" | "quantiles" | "Quantile" | "quantile" => Ok(Classification::Quantiles),
            "equal interval" | "equal_interval" | "Equal Interval" | "EqualInterval" => {
                Ok(Classification::EqualInterval)
            }
            _ => Err("Invalid classification name"),
        }
    }
}

// ColorBrewer RdYlGn, from low to high vegetation index.
const RD_YL_GN: [&[&str]; 7] = [
    &["#fc8d59", "#ffffbf", "#91cf60"],
    &["#d7191c", "#fdae61", "#a6d96a", "#1a9641"],
    &["#d7191c", "#fdae61", "#ffffbf", "#a6d96a", "#1a9641"],
    &["#d73027", "#fc8d59", "#fee08b", "#d9ef8b", "#91cf60", "#1a9850"],
    &["#d73027", "#fc8d59", "#fee08b", "#ffffbf", "#d9ef8b", "#91cf60", "#1a9850"],
    &["#d73027", "#f46d43", "#fdae61", "#fee08b", "#d9ef8b", "#a6d96a", "#66bd63", "#1a9850"],
    &["#d73027", "#f46d43", "#fdae61", "#fee08b", "#ffffbf", "#d9ef8b", "#a6d96a", "#66bd63", "#1a9850"],
];

pub const MIN_CLASS: u32 = 3;
pub const MAX_CLASS: u32 = 9;

/// Color ramp for `nb_class` classes, clamped to the available ramps.
pub fn ndvi_ramp(nb_class: u32) -> &'static [&'static str] {
    let n = nb_class.clamp(MIN_CLASS, MAX_CLASS);
    RD_YL_GN[(n - MIN_CLASS) as usize]
}

/// Number of classes for `nb_features` values (Sturges' rule).
pub fn get_nb_class(nb_features: usize) -> u32 {
    if nb_features == 0 {
        return MIN_CLASS;
    }
    let n = (1.0 + 3.3 * (nb_features as f64).log10()).floor() as u32;
    n.clamp(MIN_CLASS, MAX_CLASS)
}

pub struct Classif {
    pub values: Vec<f64>,
    bounds: Vec<f64>,
}

impl Classif {
    pub fn new(nb_class: u32, values: Vec<f64>, type_classif: Classification) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::Classification("no value to classify"));
        }
        if nb_class == 0 {
            return Err(Error::Classification("number of classes must be positive"));
        }
        let mut v = values.clone();
        v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let breaks = match type_classif {
            Classification::Quantiles => get_quantiles(&v, nb_class),
            Classification::EqualInterval => get_equal_interval(&v, nb_class),
        };
        Ok(Classif {
            values,
            bounds: breaks,
        })
    }

    pub fn breaks(&self) -> &[f64] {
        &self.bounds
    }

    pub fn nb_class(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn get_class_index(&self, value: f64) -> Option<usize> {
        if value < self.bounds[0] {
            return None;
        }
        (1..self.bounds.len())
            .find(|&i| value <= self.bounds[i])
            .map(|i| i - 1)
    }
}

fn get_equal_interval(sorted: &[f64], nb_class: u32) -> Vec<f64> {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let interval = (max - min) / nb_class as f64;
    let mut breaks: Vec<f64> = (0..nb_class).map(|i| min + interval * i as f64).collect();
    breaks.push(max);
    breaks
}

fn get_quantiles(sorted: &[f64], nb_class: u32) -> Vec<f64> {
    let nb_elem = sorted.len();
    let mut breaks = vec![sorted[0]];
    let step = nb_elem as f64 / nb_class as f64;
    for i in 1..nb_class {
        let qidx = ((i as f64 * step + 0.49).floor() as usize).max(1);
        breaks.push(sorted[qidx - 1]);
    }
    breaks.push(sorted[nb_elem - 1]);
    breaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parse_names() {
        assert_eq!("quantiles".parse::<Classification>(), Ok(Classification::Quantiles));
        assert_eq!("equal_interval".parse::<Classification>(), Ok(Classification::EqualInterval));
        assert!("jenks".parse::<Classification>().is_err());
    }

    #[test]
    fn equal_interval_breaks() {
        let classif = Classif::new(4, vec![0.8, 0.0, 0.4, 0.2], Classification::EqualInterval).unwrap();
        let expected = [0.0, 0.2, 0.4, 0.6, 0.8];
        for (b, e) in classif.breaks().iter().zip(expected.iter()) {
            assert_relative_eq!(*b, *e, epsilon = 1e-12);
        }
        assert_eq!(classif.nb_class(), 4);
        assert_eq!(classif.get_class_index(0.0), Some(0));
        assert_eq!(classif.get_class_index(0.5), Some(2));
        assert_eq!(classif.get_class_index(0.8), Some(3));
        assert_eq!(classif.get_class_index(0.9), None);
        assert_eq!(classif.get_class_index(-0.1), None);
    }

    #[test]
    fn quantile_breaks() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64 / 10.0).collect();
        let classif = Classif::new(2, values, Classification::Quantiles).unwrap();
        assert_eq!(classif.breaks(), &[0.1, 0.5, 1.0]);
        assert_eq!(classif.get_class_index(0.3), Some(0));
        assert_eq!(classif.get_class_index(0.7), Some(1));
    }

    #[test]
    fn every_value_gets_a_class() {
        let values = vec![0.12, 0.55, 0.31, 0.78, 0.44, 0.67, 0.05, 0.9];
        for kind in [Classification::Quantiles, Classification::EqualInterval] {
            let classif = Classif::new(3, values.clone(), kind).unwrap();
            for v in &values {
                let idx = classif.get_class_index(*v).unwrap();
                assert!(idx < 3);
            }
        }
    }

    #[test]
    fn empty_values_are_an_error() {
        assert!(Classif::new(3, vec![], Classification::Quantiles).is_err());
    }

    #[test]
    fn ramp_and_class_count() {
        assert_eq!(get_nb_class(1), 3);
        assert_eq!(get_nb_class(100), 7);
        assert_eq!(get_nb_class(1_000_000), 9);
        assert_eq!(ndvi_ramp(5).len(), 5);
        assert_eq!(ndvi_ramp(1).len(), 3);
        assert_eq!(ndvi_ramp(20).len(), 9);
    }
}
