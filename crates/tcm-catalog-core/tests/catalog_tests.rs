//! End-to-end catalog tests over files on disk.

use std::fs;
use std::path::Path;

use tcm_catalog_core::loader::DirectorySource;
use tcm_catalog_core::state::AppState;
use tcm_catalog_core::{open_catalog_with_config, CatalogConfig, FfiExpertFilters, FfiHerbFilters};

const HERBS: &str = r#"[
    {
        "id": "herb_1",
        "name": "人参",
        "pinyin": "Ren Shen",
        "nature": "微温",
        "taste": ["甘", "微苦"],
        "category": "补虚药",
        "functions": ["大补元气", "补脾益肺"],
        "meridians": ["脾", "肺", "心"],
        "origin": ["吉林省", "辽宁"]
    },
    {
        "id": "herb_2",
        "name": "黄连",
        "nature": "寒",
        "taste": ["苦"],
        "category": "清热药",
        "functions": ["清热燥湿"],
        "origin": ["四川"]
    },
    {
        "id": "herb_3",
        "name": "白术",
        "nature": "温",
        "taste": ["苦", "甘"],
        "category": "补虚药",
        "functions": ["健脾益气"],
        "origin": ["浙江"]
    }
]"#;

const EXPERTS: &str = r#"[
    {
        "id": "expert_1",
        "name": "邓铁涛",
        "category": "内科",
        "academic_title": "国医大师",
        "school": "岭南医学",
        "specialty": ["脾胃病"],
        "experience": 70,
        "birthYear": 1916,
        "specializations": ["脾胃病学"],
        "relatedFormulas": [
            {"id": "formula_1", "name": "四君子汤", "relationship": "创制者"}
        ]
    },
    {
        "id": "expert_2",
        "name": "路志正",
        "category": "内科",
        "academic_title": "国医大师",
        "school": "燕京医学",
        "specialty": ["风湿病"],
        "experience": 60,
        "birthYear": 1920
    }
]"#;

const FORMULAS: &str = r#"[
    {
        "id": "formula_1",
        "name": "四君子汤",
        "category": "补益剂",
        "ingredients": [
            {"name": "人参", "dosage": "9g", "role": "monarch"},
            {"name": "白术", "dosage": "9g", "role": "minister"}
        ]
    }
]"#;

fn write_dataset(dir: &Path, with_formulas: bool) {
    fs::write(dir.join("herbs.json"), HERBS).unwrap();
    fs::write(dir.join("experts.json"), EXPERTS).unwrap();
    if with_formulas {
        fs::write(dir.join("formulas.json"), FORMULAS).unwrap();
    }
}

fn write_config(path: &Path, data_dir: &Path, db_path: &Path) {
    let toml = format!(
        "[data]\ndirectory = {:?}\n\n[storage]\ndatabase_path = {:?}\n\n[history]\ncapacity = 5\n",
        data_dir.display().to_string(),
        db_path.display().to_string(),
    );
    fs::write(path, toml).unwrap();
}

#[test]
fn test_directory_load_and_filter() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), true);

    let mut state = AppState::new();
    state.load_from(&DirectorySource::new(dir.path()));

    assert!(state.error().is_none());
    assert_eq!(state.herbs().len(), 3);
    assert_eq!(state.experts().len(), 2);

    state.update_herb_filters(|f| {
        f.category = Some("补虚药".into());
        f.taste = Some("甘".into());
    });
    let ids: Vec<&str> = state.filtered_herbs().iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["herb_1", "herb_3"]);

    let stats = state.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.categories, 2);
    assert_eq!(stats.provinces, 4);
}

#[test]
fn test_missing_herbs_file_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("experts.json"), EXPERTS).unwrap();

    let mut state = AppState::new();
    state.load_from(&DirectorySource::new(dir.path()));

    assert!(state.herbs().is_empty());
    assert_eq!(state.experts().len(), 2);
    assert!(state.error().is_some_and(|e| e.contains("herbs")));
}

#[test]
fn test_configured_catalog_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir(&data_dir).unwrap();
    write_dataset(&data_dir, true);
    let config_path = dir.path().join("catalog.toml");
    let db_path = dir.path().join("catalog.db");
    write_config(&config_path, &data_dir, &db_path);

    let catalog = open_catalog_with_config(config_path.display().to_string()).unwrap();
    assert!(catalog.error().unwrap().is_none());
    assert_eq!(catalog.stats().unwrap().total, 3);

    let herbs = catalog
        .set_herb_filters(FfiHerbFilters {
            search_term: Some("ren shen".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(herbs.len(), 1);

    let experts = catalog
        .set_expert_filters(FfiExpertFilters {
            experience_range: Some("65-".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(experts.len(), 1);
    assert_eq!(experts[0].id, "expert_1");

    catalog.select_herb(Some("herb_2".into())).unwrap();
    catalog.select_herb(Some("herb_1".into())).unwrap();

    catalog.add_expert_to_compare("expert_1".into()).unwrap();
    catalog.add_expert_to_compare("expert_2".into()).unwrap();
    let comparison = catalog.expert_comparison_json().unwrap().unwrap();
    assert!(comparison.contains("multiple_national_masters"));
    assert!(comparison.contains("same_era"));

    let network = catalog
        .build_network(catalog.default_network_filters().unwrap(), Some(1280))
        .unwrap();
    assert!(network
        .edges
        .iter()
        .any(|e| e.source == "expert_1" && e.target == "formula_1" && e.relation == "creates"));
    drop(catalog);

    // Formulas file gone: the network falls back to the stored cache
    fs::remove_file(data_dir.join("formulas.json")).unwrap();
    let reopened = open_catalog_with_config(config_path.display().to_string()).unwrap();
    assert_eq!(reopened.view_history().unwrap(), vec!["herb_1", "herb_2"]);
    let network = reopened
        .build_network(reopened.default_network_filters().unwrap(), None)
        .unwrap();
    assert!(network.nodes.iter().any(|n| n.id == "formula_1"));
}

#[test]
fn test_config_defaults_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = CatalogConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.herbs_path(), Path::new("data").join("herbs.json"));
}
