// Chord diagram mutators: fingers, barres, string markers and labels

use chord_chart::models::{
    Barre, ChartError, ChordDiagram, Finger, FingerPosition, StringState,
};

/// No string may be muted, open and fingered at once
fn assert_exclusive(diagram: &ChordDiagram) {
    for string in 1..=6u8 {
        let muted = diagram.muted_strings.contains(&string);
        let open = diagram.open_strings.contains(&string);
        let fingered = diagram.finger_on(string).is_some();
        assert!(
            [muted, open, fingered].iter().filter(|b| **b).count() <= 1,
            "string {} has conflicting markings: {:?}",
            string,
            diagram
        );
    }
    for barre in &diagram.barres {
        for finger in &diagram.fingers {
            assert!(!barre.covers(finger.string, finger.fret), "finger under barre");
        }
    }
}

#[test]
fn test_finger_toggle_on_and_off() {
    let mut diagram = ChordDiagram::new("c1");

    diagram.set_finger_at(5, 3).expect("valid cell");
    assert_eq!(diagram.fingers, vec![FingerPosition::new(5, 3)]);

    diagram.set_finger_at(5, 3).expect("valid cell");
    assert!(diagram.fingers.is_empty(), "second click removes the finger");
}

#[test]
fn test_finger_moves_along_string() {
    let mut diagram = ChordDiagram::new("c1");
    diagram.set_finger_at(3, 1).unwrap();
    diagram.set_finger_at(3, 2).unwrap();
    assert_eq!(diagram.fingers, vec![FingerPosition::new(3, 2)]);
}

#[test]
fn test_finger_clears_string_marker() {
    let mut diagram = ChordDiagram::new("c1");
    diagram.toggle_string_top_state(4).unwrap();
    assert_eq!(diagram.string_state(4), StringState::Muted);

    diagram.set_finger_at(4, 2).unwrap();
    assert_eq!(diagram.string_state(4), StringState::Unset);
    assert_exclusive(&diagram);
}

#[test]
fn test_string_marker_cycle_removes_finger() {
    let mut diagram = ChordDiagram::new("c1");
    diagram.set_finger_at(1, 3).unwrap();

    assert_eq!(diagram.toggle_string_top_state(1), Ok(StringState::Muted));
    assert!(diagram.finger_on(1).is_none());
    assert_exclusive(&diagram);

    assert_eq!(diagram.toggle_string_top_state(1), Ok(StringState::Open));
    assert_eq!(diagram.muted_strings, Vec::<u8>::new());
    assert_eq!(diagram.open_strings, vec![1]);

    assert_eq!(diagram.toggle_string_top_state(1), Ok(StringState::Unset));
    assert!(!diagram.is_edited());
}

#[test]
fn test_barre_drag_either_direction() {
    let mut a = ChordDiagram::new("a");
    let mut b = ChordDiagram::new("b");
    a.set_barre(1, 6, 1).unwrap();
    b.set_barre(1, 1, 6).unwrap();
    assert_eq!(a.barres, b.barres);
    assert_eq!(a.barres[0], Barre { fret: 1, from_string: 6, to_string: 1 });
}

#[test]
fn test_barre_retracts_covered_fingers_and_markers() {
    let mut diagram = ChordDiagram::new("f");
    diagram.set_finger_at(2, 1).unwrap();
    diagram.set_finger_at(3, 2).unwrap();
    diagram.toggle_string_top_state(6).unwrap();

    diagram.set_barre(1, 1, 6).unwrap();

    assert_eq!(diagram.fingers, vec![FingerPosition::new(3, 2)]);
    assert!(diagram.muted_strings.is_empty());
    assert_exclusive(&diagram);
}

#[test]
fn test_barre_replaces_barre_on_same_fret() {
    let mut diagram = ChordDiagram::new("f");
    diagram.set_barre(3, 1, 6).unwrap();
    diagram.set_barre(3, 2, 4).unwrap();
    assert_eq!(diagram.barres, vec![Barre::new(3, 2, 4)]);
}

#[test]
fn test_click_on_barre_removes_it() {
    let mut diagram = ChordDiagram::new("f");
    diagram.set_barre(2, 1, 5).unwrap();
    diagram.set_finger_at(3, 2).unwrap();
    assert!(diagram.barres.is_empty());
    assert!(diagram.fingers.is_empty(), "the click only removes the barre");
}

#[test]
fn test_degenerate_barre_rejected() {
    let mut diagram = ChordDiagram::new("f");
    assert_eq!(diagram.set_barre(2, 3, 3), Err(ChartError::DegenerateBarre));
    assert!(diagram.barres.is_empty());
}

#[test]
fn test_out_of_range_string_and_fret_rejected() {
    let mut diagram = ChordDiagram::new("x");
    assert_eq!(diagram.set_finger_at(7, 1), Err(ChartError::StringOutOfRange(7)));
    assert_eq!(diagram.toggle_string_top_state(0), Err(ChartError::StringOutOfRange(0)));
    assert!(matches!(diagram.set_finger_at(1, 9), Err(ChartError::FretOutOfRange { .. })));
    assert!(!diagram.is_edited());
}

#[test]
fn test_finger_label_cycle() {
    let mut diagram = ChordDiagram::new("x");
    let seen: Vec<_> = (0..5).map(|_| diagram.cycle_finger_label(4).unwrap()).collect();
    assert_eq!(
        seen,
        vec![
            Some(Finger::Index),
            Some(Finger::Middle),
            Some(Finger::Ring),
            Some(Finger::Pinky),
            None
        ]
    );
    assert!(diagram.finger_labels.is_empty());
}

#[test]
fn test_start_fret_and_nut() {
    let mut diagram = ChordDiagram::new("x");
    assert!(diagram.shows_nut());
    diagram.set_start_fret(5).unwrap();
    assert!(!diagram.shows_nut());
    assert_eq!(diagram.set_start_fret(0), Err(ChartError::InvalidStartFret(0)));
    assert_eq!(diagram.start_fret, 5);
}

#[test]
fn test_clear_keeps_identity_and_geometry() {
    let mut diagram = ChordDiagram::with_frets("keep", 5);
    diagram.set_start_fret(3).unwrap();
    diagram.set_name("D/F#").unwrap();
    diagram.set_barre(3, 1, 4).unwrap();
    diagram.cycle_finger_label(1).unwrap();

    diagram.clear();

    assert_eq!(diagram.id, "keep");
    assert_eq!(diagram.frets, 5);
    assert_eq!(diagram.start_fret, 3);
    assert!(!diagram.is_edited());
    assert!(diagram.finger_labels.is_empty());
}

#[test]
fn test_diagram_json_field_names() {
    let mut diagram = ChordDiagram::new("j");
    diagram.set_barre(1, 1, 6).unwrap();
    diagram.cycle_finger_label(2).unwrap();
    let json = serde_json::to_value(&diagram).unwrap();
    assert_eq!(json["startFret"], 1);
    assert_eq!(json["barres"][0]["fromString"], 6);
    assert_eq!(json["barres"][0]["toString"], 1);
    assert_eq!(json["fingerLabels"][0]["finger"], 1);
    assert!(json["mutedStrings"].is_array());
}

/// Small deterministic generator so the sequence is the same on every run
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u8) -> u8 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as u8
    }
}

#[test]
fn test_markings_stay_exclusive_under_mixed_edits() {
    for seed in 0..20u64 {
        let mut rng = Lcg(seed);
        let mut diagram = ChordDiagram::with_frets("mixed", 5);
        for step in 0..500 {
            let string = rng.next(6) + 1;
            let fret = rng.next(5) + 1;
            match rng.next(4) {
                0 => diagram.set_finger_at(string, fret).unwrap(),
                1 => {
                    diagram.toggle_string_top_state(string).unwrap();
                }
                2 => {
                    let other = rng.next(6) + 1;
                    match diagram.set_barre(fret, string, other) {
                        Ok(()) => {
                            let barre = Barre::new(fret, string, other);
                            assert!(diagram
                                .fingers
                                .iter()
                                .all(|f| !(f.fret == fret && barre.strings().contains(&f.string))));
                        }
                        Err(e) => {
                            assert_eq!(string, other, "seed {} step {}", seed, step);
                            assert_eq!(e, ChartError::DegenerateBarre);
                        }
                    }
                }
                _ => {
                    diagram.cycle_finger_label(string).unwrap();
                }
            }

            assert_exclusive(&diagram);
            let mut strings: Vec<_> = diagram.fingers.iter().map(|f| f.string).collect();
            strings.sort_unstable();
            strings.dedup();
            assert_eq!(strings.len(), diagram.fingers.len(), "one finger per string");
            let mut frets: Vec<_> = diagram.barres.iter().map(|b| b.fret).collect();
            frets.sort_unstable();
            frets.dedup();
            assert_eq!(frets.len(), diagram.barres.len(), "one barre per fret");
        }
    }
}

#[test]
fn test_every_cell_toggles_back() {
    for string in 1..=6u8 {
        for fret in 1..=4u8 {
            let mut diagram = ChordDiagram::new("cell");
            diagram.set_finger_at(string % 6 + 1, 2).unwrap();
            let before = diagram.clone();
            diagram.set_finger_at(string, fret).unwrap();
            assert_exclusive(&diagram);
            diagram.set_finger_at(string, fret).unwrap();
            assert_eq!(diagram, before, "string {} fret {}", string, fret);
        }
    }
}
