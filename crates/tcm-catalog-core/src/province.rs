//! Province name normalisation and origin distribution.
//!
//! Herb origins arrive in mixed forms ("吉林省", "吉林", "广东开平"). Everything
//! is reduced to the short province name before counting or matching.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::Herb;

/// Short name and the full administrative name of every province-level region.
const PROVINCES: [(&str, &str); 34] = [
    ("北京", "北京市"),
    ("天津", "天津市"),
    ("上海", "上海市"),
    ("重庆", "重庆市"),
    ("河北", "河北省"),
    ("山西", "山西省"),
    ("内蒙古", "内蒙古自治区"),
    ("辽宁", "辽宁省"),
    ("吉林", "吉林省"),
    ("黑龙江", "黑龙江省"),
    ("江苏", "江苏省"),
    ("浙江", "浙江省"),
    ("安徽", "安徽省"),
    ("福建", "福建省"),
    ("江西", "江西省"),
    ("山东", "山东省"),
    ("河南", "河南省"),
    ("湖北", "湖北省"),
    ("湖南", "湖南省"),
    ("广东", "广东省"),
    ("广西", "广西壮族自治区"),
    ("海南", "海南省"),
    ("四川", "四川省"),
    ("贵州", "贵州省"),
    ("云南", "云南省"),
    ("西藏", "西藏自治区"),
    ("陕西", "陕西省"),
    ("甘肃", "甘肃省"),
    ("青海", "青海省"),
    ("宁夏", "宁夏回族自治区"),
    ("新疆", "新疆维吾尔自治区"),
    ("香港", "香港特别行政区"),
    ("澳门", "澳门特别行政区"),
    ("台湾", "台湾省"),
];

/// Longest first so the ethnic autonomous-region forms win over "自治区".
const SUFFIXES: [&str; 7] = [
    "维吾尔自治区",
    "壮族自治区",
    "回族自治区",
    "特别行政区",
    "自治区",
    "省",
    "市",
];

/// Reduce a place name to its short province name.
///
/// Unknown names come back with the administrative suffix removed.
pub fn normalize_short(name: &str) -> String {
    let trimmed = name.trim();
    let stripped = SUFFIXES
        .iter()
        .find_map(|s| trimmed.strip_suffix(s))
        .unwrap_or(trimmed)
        .trim();

    PROVINCES
        .iter()
        .map(|(short, _)| *short)
        .find(|short| stripped.starts_with(short))
        .unwrap_or(stripped)
        .to_string()
}

pub fn is_valid_province(name: &str) -> bool {
    let short = normalize_short(name);
    PROVINCES.iter().any(|(s, _)| *s == short)
}

/// Normalise every name, dropping the ones that end up empty.
pub fn normalize_province_list<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|n| normalize_short(n.as_ref()))
        .filter(|n| !n.is_empty())
        .collect()
}

/// Pick the spelling of `name` present in `known`, e.g. a map's region names.
///
/// Falls back to the short name when no spelling matches.
pub fn resolve_name(name: &str, known: &HashSet<String>) -> String {
    let short = normalize_short(name);
    let full = PROVINCES
        .iter()
        .find(|(s, _)| *s == short)
        .map(|(_, full)| full.to_string());

    let candidates = full
        .into_iter()
        .chain(std::iter::once(short.clone()))
        .chain(SUFFIXES.iter().map(|s| format!("{short}{s}")));
    for candidate in candidates {
        if known.contains(&candidate) {
            return candidate;
        }
    }
    short
}

/// Herbs originating from one province.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProvinceCount {
    pub province: String,
    pub herb_count: usize,
    /// Names of the herbs, in collection order
    pub herbs: Vec<String>,
}

/// Herb counts per normalised origin province, largest first then by name.
pub fn province_distribution(herbs: &[Herb]) -> Vec<ProvinceCount> {
    let mut by_province: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for herb in herbs {
        let provinces: HashSet<String> = normalize_province_list(herb.origin.as_slice())
            .into_iter()
            .collect();
        for province in provinces {
            by_province
                .entry(province)
                .or_default()
                .push(herb.name.clone());
        }
    }

    let mut counts: Vec<ProvinceCount> = by_province
        .into_iter()
        .map(|(province, herbs)| ProvinceCount {
            province,
            herb_count: herbs.len(),
            herbs,
        })
        .collect();
    counts.sort_by(|a, b| {
        b.herb_count
            .cmp(&a.herb_count)
            .then_with(|| a.province.cmp(&b.province))
    });
    counts
}
