//! Configuration expansion: one variant's technical sheet in, one
//! configuration row per aligned index out.
//!
//! Spec lists are sized independently. Record `i` takes element `i` of each
//! list when present. A record survives only when its watt and lumens are both
//! positive; the rest are counted and dropped.

use std::collections::BTreeMap;

use lumcat_core::ModelEntry;
use lumcat_normalize::{
    lookup_key, normalize_label_list, normalize_list, parse_voltage_range, to_int_list,
    to_num_list, VoltageRange,
};
use serde_json::{Map, Value};

use crate::types::ConfigurationRow;

/// Spec keys with a dedicated meaning, compared by [`lookup_key`].
const WATT_KEYS: &[&str] = &["watt", "watts", "w", "potencia"];
const LUMEN_KEYS: &[&str] = &["lumen", "lumens", "lm"];
const VOLT_KEYS: &[&str] = &["volt", "volts", "voltaje", "voltage"];
const DIAMETER_KEYS: &[&str] = &["diametro", "diameter"];
const LENGTH_KEYS: &[&str] = &["largo", "length"];
const WIDTH_KEYS: &[&str] = &["ancho", "width"];
const KELVIN_KEYS: &[&str] = &["kelvin", "k", "temperatura"];
const SKU_KEYS: &[&str] = &["sku", "codigo"];
/// Catalog-bearing keys, consumed by relation linking rather than stored.
pub(crate) const TONE_KEYS: &[&str] = &["tono", "tonos", "tono de luz"];
pub(crate) const FINISH_KEYS: &[&str] = &["acabado", "acabados"];

/// Returns the first spec value whose key matches one of `keys`.
pub(crate) fn spec_field<'a>(model: &'a ModelEntry, keys: &[&str]) -> &'a Value {
    model
        .spec_entries()
        .find(|(key, _)| keys.contains(&lookup_key(key).as_str()))
        .map_or(&Value::Null, |(_, value)| value)
}

fn is_known_key(key: &str) -> bool {
    let key = lookup_key(key);
    [
        WATT_KEYS,
        LUMEN_KEYS,
        VOLT_KEYS,
        DIAMETER_KEYS,
        LENGTH_KEYS,
        WIDTH_KEYS,
        KELVIN_KEYS,
        SKU_KEYS,
        TONE_KEYS,
        FINISH_KEYS,
    ]
    .iter()
    .any(|keys| keys.contains(&key.as_str()))
}

/// Normalized per-index spec lists of one variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecLists {
    pub watt: Vec<f64>,
    pub lumens: Vec<f64>,
    /// Whether the lumen field carried any token at all, parseable or not.
    pub lumens_given: bool,
    pub voltage: Vec<f64>,
    pub voltage_range: Option<VoltageRange>,
    pub diameter: Vec<String>,
    pub length: Vec<f64>,
    pub width: Vec<f64>,
    pub kelvin: Vec<i64>,
    pub skus: Vec<String>,
    /// Unrecognised spec keys, in key order.
    pub extra: BTreeMap<String, Vec<String>>,
}

impl SpecLists {
    #[must_use]
    pub fn from_model(model: &ModelEntry) -> Self {
        let lumen_raw = spec_field(model, LUMEN_KEYS);
        let volt_raw = spec_field(model, VOLT_KEYS);

        let extra = model
            .spec_entries()
            .filter(|(key, _)| !is_known_key(key))
            .map(|(key, value)| (key.clone(), normalize_label_list(value)))
            .filter(|(_, tokens)| !tokens.is_empty())
            .collect();

        Self {
            watt: to_num_list(spec_field(model, WATT_KEYS)),
            lumens: to_num_list(lumen_raw),
            lumens_given: !normalize_list(lumen_raw).is_empty(),
            voltage: to_num_list(volt_raw),
            voltage_range: parse_voltage_range(volt_raw),
            diameter: normalize_list(spec_field(model, DIAMETER_KEYS)),
            length: to_num_list(spec_field(model, LENGTH_KEYS)),
            width: to_num_list(spec_field(model, WIDTH_KEYS)),
            kelvin: to_int_list(spec_field(model, KELVIN_KEYS)),
            skus: normalize_label_list(spec_field(model, SKU_KEYS)),
            extra,
        }
    }

    /// Number of candidate records: the longest dimension list, at least one.
    #[must_use]
    pub fn record_count(&self) -> usize {
        [
            self.watt.len(),
            self.lumens.len(),
            self.diameter.len(),
            self.length.len(),
            self.width.len(),
            1,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandOptions {
    /// Voltage used when the variant lists none.
    pub default_voltage: f64,
    /// Efficacy used to estimate lumens when the variant has no lumen data.
    pub lumens_per_watt: f64,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            default_voltage: 220.0,
            lumens_per_watt: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub configurations: Vec<ConfigurationRow>,
    /// Candidate records dropped for a missing or non-positive watt/lumens.
    pub dropped: usize,
}

/// Expands `lists` into configuration rows for `variant_code`.
#[must_use]
pub fn expand(variant_code: &str, lists: &SpecLists, options: &ExpandOptions) -> Expansion {
    let mut expansion = Expansion::default();

    for i in 0..lists.record_count() {
        let watt = lists.watt.get(i).copied();
        let (lumens, estimated) = if lists.lumens_given {
            (lists.lumens.get(i).copied(), false)
        } else {
            (watt.map(|w| (w * options.lumens_per_watt).round()), true)
        };

        let (Some(watt), Some(lumens)) = (watt, lumens) else {
            tracing::debug!(
                variant = %variant_code,
                index = i,
                "configuration missing watt or lumens; dropped"
            );
            expansion.dropped += 1;
            continue;
        };
        if watt <= 0.0 || lumens <= 0.0 {
            tracing::debug!(
                variant = %variant_code,
                index = i,
                watt,
                lumens,
                "non-positive watt or lumens; dropped"
            );
            expansion.dropped += 1;
            continue;
        }

        let mut extra_specs = Map::new();
        if let Some(kelvin) = lists.kelvin.get(i).or_else(|| lists.kelvin.first()) {
            extra_specs.insert("kelvin".to_string(), Value::from(*kelvin));
        }
        if estimated {
            extra_specs.insert("lumens_estimated".to_string(), Value::Bool(true));
        }
        for (key, tokens) in &lists.extra {
            let value = match tokens.as_slice() {
                [single] => Value::String(single.clone()),
                many => Value::from(many.to_vec()),
            };
            extra_specs.insert(key.clone(), value);
        }

        expansion.configurations.push(ConfigurationRow {
            variant_code: variant_code.to_string(),
            sku: lists
                .skus
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("{variant_code}-cfg{}", i + 1)),
            watt,
            lumens,
            voltage: lists
                .voltage
                .get(i)
                .or_else(|| lists.voltage.first())
                .copied()
                .unwrap_or(options.default_voltage),
            voltage_min: lists.voltage_range.as_ref().map(|r| r.min),
            voltage_max: lists.voltage_range.as_ref().map(|r| r.max),
            voltage_label: lists.voltage_range.as_ref().map(|r| r.label.clone()),
            length: lists.length.get(i).copied(),
            width: lists.width.get(i).copied(),
            diameter_label: lists.diameter.get(i).cloned(),
            extra_specs,
        });
    }

    expansion
}

#[cfg(test)]
#[path = "expand_test.rs"]
mod tests;
