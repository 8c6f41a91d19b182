//! Pointer and keyboard handling for one chord diagram
//!
//! Turns grid events into diagram mutations:
//! - click on a cell toggles a finger (or clears the barre under it)
//! - drag along one fret across strings commits a barre on release
//! - click above the nut cycles unset/muted/open
//! - click below a string cycles its finger-number label
//!
//! Drag state is transient. Nothing reaches the diagram until release, and
//! a drag that leaves the grid is thrown away.

use serde::{Deserialize, Serialize};

use crate::models::{Barre, ChartError, ChordDiagram};
use crate::presets::PresetProvider;

/// A (string, fret) position on the grid
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub string: u8,
    pub fret: u8,
}

impl GridCell {
    pub fn new(string: u8, fret: u8) -> Self {
        Self { string, fret }
    }
}

/// Pointer held down on the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragGesture {
    pub start: GridCell,
    pub current: GridCell,
}

impl DragGesture {
    /// Same fret, different strings: releasing here makes a barre
    pub fn is_barre(&self) -> bool {
        self.start.fret == self.current.fret && self.start.string != self.current.string
    }

    pub fn barre(&self) -> Option<Barre> {
        self.is_barre()
            .then(|| Barre::new(self.start.fret, self.start.string, self.current.string))
    }
}

/// Input for the diagram editor, as sent by the presentation layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiagramEvent {
    PointerDown { string: u8, fret: u8 },
    PointerMove { string: u8, fret: u8 },
    PointerUp { string: u8, fret: u8 },
    PointerLeave,
    /// Click on the marker row above the nut
    ToggleStringTop { string: u8 },
    /// Click on the label row below the grid
    CycleFingerLabel { string: u8 },
    SetStartFret { fret: u8 },
    SetName { name: String },
    /// Replace all markings with a named preset
    ApplyPreset { name: String },
    Clear,
}

/// Draft copy of one diagram plus its in-flight drag
#[derive(Clone, Debug)]
pub struct DiagramEditor {
    diagram: ChordDiagram,
    drag: Option<DragGesture>,
}

impl DiagramEditor {
    pub fn new(diagram: ChordDiagram) -> Self {
        Self { diagram, drag: None }
    }

    pub fn diagram(&self) -> &ChordDiagram {
        &self.diagram
    }

    pub fn into_diagram(self) -> ChordDiagram {
        self.diagram
    }

    pub fn drag(&self) -> Option<&DragGesture> {
        self.drag.as_ref()
    }

    /// Barre the current drag would create, for rendering a preview
    pub fn barre_preview(&self) -> Option<Barre> {
        self.drag.and_then(|d| d.barre())
    }

    /// Apply one event; returns whether the diagram changed
    ///
    /// Rejected mutations leave the diagram untouched and are logged.
    pub fn handle(&mut self, event: DiagramEvent, presets: &dyn PresetProvider) -> bool {
        match self.apply(event, presets) {
            Ok(changed) => changed,
            Err(e) => {
                log::warn!("Ignoring diagram edit on {}: {}", self.diagram.id, e);
                false
            }
        }
    }

    fn apply(&mut self, event: DiagramEvent, presets: &dyn PresetProvider) -> Result<bool, ChartError> {
        match event {
            DiagramEvent::PointerDown { string, fret } => {
                let cell = GridCell::new(string, fret);
                self.drag = Some(DragGesture { start: cell, current: cell });
                Ok(false)
            }
            DiagramEvent::PointerMove { string, fret } => {
                if let Some(drag) = self.drag.as_mut() {
                    drag.current = GridCell::new(string, fret);
                }
                Ok(false)
            }
            DiagramEvent::PointerUp { string, fret } => self.release(GridCell::new(string, fret)),
            DiagramEvent::PointerLeave => {
                if self.drag.take().is_some() {
                    log::debug!("Drag left the grid, discarded");
                }
                Ok(false)
            }
            DiagramEvent::ToggleStringTop { string } => {
                self.diagram.toggle_string_top_state(string)?;
                Ok(true)
            }
            DiagramEvent::CycleFingerLabel { string } => {
                self.diagram.cycle_finger_label(string)?;
                Ok(true)
            }
            DiagramEvent::SetStartFret { fret } => {
                self.diagram.set_start_fret(fret)?;
                Ok(true)
            }
            DiagramEvent::SetName { name } => {
                self.diagram.set_name(name)?;
                Ok(true)
            }
            DiagramEvent::ApplyPreset { name } => match presets.get_chord_preset(&name) {
                Some(preset) => {
                    preset.apply_to(&mut self.diagram);
                    Ok(true)
                }
                None => {
                    log::info!("No chord preset named '{}'", name);
                    Ok(false)
                }
            },
            DiagramEvent::Clear => {
                self.diagram.clear();
                Ok(true)
            }
        }
    }

    /// Finish a gesture: barre, plain click, or nothing
    fn release(&mut self, cell: GridCell) -> Result<bool, ChartError> {
        let Some(mut drag) = self.drag.take() else {
            return Ok(false);
        };
        drag.current = cell;

        if drag.is_barre() {
            self.diagram
                .set_barre(drag.start.fret, drag.start.string, drag.current.string)?;
            Ok(true)
        } else if drag.current == drag.start {
            self.diagram.set_finger_at(cell.string, cell.fret)?;
            Ok(true)
        } else {
            log::debug!("Drag across frets released, discarded");
            Ok(false)
        }
    }
}
