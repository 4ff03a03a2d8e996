//! Tests for the sound catalog.

use super::*;
use tempfile::tempdir;

#[test]
fn test_from_items_preserves_order() {
    let catalog = SoundCatalog::from_items(vec![
        SoundItem::new("Riacho", "/sounds/riacho.wav"),
        SoundItem::new("Vento", "/sounds/vento.wav"),
        SoundItem::new("Chuva", "/sounds/chuva.wav"),
    ])
    .unwrap();

    let names: Vec<&str> = catalog.items().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Riacho", "Vento", "Chuva"]);
    assert_eq!(catalog.len(), 3);
}

#[test]
fn test_duplicate_names_rejected() {
    let result = SoundCatalog::from_items(vec![
        SoundItem::new("Chuva", "/sounds/chuva.wav"),
        SoundItem::new("Chuva", "/sounds/chuva.mp3"),
    ]);

    match result {
        Err(CatalogError::DuplicateName(name)) => assert_eq!(name, "Chuva"),
        other => panic!("expected DuplicateName error, got {:?}", other),
    }
}

#[test]
fn test_lookup_by_name() {
    let catalog = SoundCatalog::from_items(vec![
        SoundItem::new("Vento", "/sounds/vento.wav"),
    ])
    .unwrap();

    assert!(catalog.get("Vento").is_some());
    assert_eq!(catalog.get("Vento").unwrap().path, PathBuf::from("/sounds/vento.wav"));
    assert!(catalog.get("vento").is_none());
    assert!(catalog.get("Chuva").is_none());
}

#[test]
fn test_scan_dir_filters_and_sorts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("vento.wav"), b"")?;
    std::fs::write(dir.path().join("chuva.mp3"), b"")?;
    std::fs::write(dir.path().join("riacho.flac"), b"")?;
    std::fs::write(dir.path().join("notes.txt"), b"")?;

    let catalog = SoundCatalog::scan_dir(dir.path())?;
    let names: Vec<&str> = catalog.items().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["chuva", "riacho", "vento"]);
    Ok(())
}

#[test]
fn test_scan_dir_empty_is_error() {
    let dir = tempdir().unwrap();
    match SoundCatalog::scan_dir(dir.path()) {
        Err(CatalogError::Empty(_)) => {}
        other => panic!("expected Empty error, got {:?}", other),
    }
}
