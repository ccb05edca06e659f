// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::*;

fn tune(title: &str) -> Tune {
    Tune {
        id: TuneId::new(66),
        title: title.to_owned(),
        genre_id: Some(GenreId::from("irish")),
        tune_type: Some("reel".to_owned()),
        mode: None,
    }
}

#[test]
fn validate_title() {
    assert!(tune("The Silver Spear").is_valid());
    assert!(!tune("").is_valid());
    assert!(!tune(" \t").is_valid());
}

#[test]
fn validate_optional_attributes() {
    let mut tune = tune("Drowsy Maggie");
    tune.mode = Some(" ".to_owned());
    assert!(!tune.is_valid());
    tune.mode = Some("E dorian".to_owned());
    assert!(tune.is_valid());
    tune.tune_type = Some(String::new());
    assert!(!tune.is_valid());
}

#[test]
fn tune_ids_are_ordered_numerically() {
    assert!(TuneId::new(70) < TuneId::new(3497));
    assert_eq!("3497", TuneId::new(3497).to_string());
}
