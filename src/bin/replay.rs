//! Replay a JSON input script through a zoom + drag + brush scene and print
//! every emitted event as one JSON line on stdout.
//!
//! ```text
//! replay script.json
//! echo '{"steps":[{"op":"wheel","x":400,"y":300,"delta_y":-120}]}' | replay
//! ```
//!
//! The scene is fixed: an 800×600 root with a background rect, a zoomable
//! layer holding one node pinned in simulation `sim`, and a brush over the
//! whole root. Step targets name one of those elements.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use scene_interact::brush::BrushController;
use scene_interact::config::InteractionConfig;
use scene_interact::consts::CLASS_BACKGROUND;
use scene_interact::datum::DatumTable;
use scene_interact::drag::{DragController, DragMode};
use scene_interact::error::ConfigError;
use scene_interact::events::Emitter;
use scene_interact::geometry::{Point, Rect, Size};
use scene_interact::input::{Button, DeltaMode, Modifiers, PointerEvent, PointerId, WheelEvent};
use scene_interact::zoom::ZoomController;
use scene_interact::{ElementId, InteractionContext, MemorySurface, Surface};

const SCENE_WIDTH: f64 = 800.0;
const SCENE_HEIGHT: f64 = 600.0;
const SIMULATION_ID: &str = "sim";

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode script: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Parser, Debug)]
#[command(name = "replay", about = "Replay interaction scripts against an in-memory scene")]
struct Cli {
    /// Script path; reads stdin when omitted.
    script: Option<PathBuf>,

    /// JSON interaction config; falls back to INTERACT_* variables.
    #[arg(long, env = "INTERACT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Target {
    Root,
    Background,
    Node,
    Overlay,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
        #[serde(default)]
        ctrl: bool,
    },
    Down {
        #[serde(default = "default_pointer")]
        pointer: PointerId,
        target: Target,
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
    },
    Move {
        #[serde(default = "default_pointer")]
        pointer: PointerId,
        x: f64,
        y: f64,
    },
    Up {
        #[serde(default = "default_pointer")]
        pointer: PointerId,
        x: f64,
        y: f64,
    },
    ZoomTo {
        k: f64,
        x: Option<f64>,
        y: Option<f64>,
    },
    Reset,
}

fn default_pointer() -> PointerId {
    1
}

type Log = Rc<RefCell<Vec<Value>>>;

struct Scene {
    surface: MemorySurface,
    datums: DatumTable,
    root: ElementId,
    background: ElementId,
    node: ElementId,
    zoom: ZoomController,
    drag: DragController,
    brush: Option<BrushController>,
    /// Last down target per pointer, so move/up report a plausible target.
    targets: Vec<(PointerId, ElementId)>,
}

fn main() -> Result<(), ReplayError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => InteractionConfig::from_json(&fs::read_to_string(path)?)?,
        None => InteractionConfig::from_env(),
    };
    let raw = match &cli.script {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let script: Script = serde_json::from_str(&raw)?;

    let ctx = InteractionContext::new(config);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut scene = build_scene(&ctx, &log);
    tracing::info!(steps = script.steps.len(), "replaying script");

    for (index, step) in script.steps.into_iter().enumerate() {
        let handled = scene.apply(step);
        tracing::debug!(index, handled, "step applied");
        for event in log.borrow_mut().drain(..) {
            println!("{}", json!({ "step": index, "event": event }));
        }
    }
    Ok(())
}

fn build_scene(ctx: &InteractionContext, log: &Log) -> Scene {
    let mut surface = MemorySurface::new();
    let root = surface.create_root("svg");
    surface.set_extent(root, Size::new(SCENE_WIDTH, SCENE_HEIGHT));
    let background = surface.create_element(root, "rect").unwrap_or(root);
    surface.add_class(background, CLASS_BACKGROUND);
    let layer = surface.create_element(root, "g").unwrap_or(root);
    let node = surface.create_element(layer, "circle").unwrap_or(layer);

    let mut datums = DatumTable::new();
    datums.bind(node, json!({ "id": "n0", "x": SCENE_WIDTH / 2.0, "y": SCENE_HEIGHT / 2.0 }));
    surface.set_attribute(node, "cx", &(SCENE_WIDTH / 2.0).to_string());
    surface.set_attribute(node, "cy", &(SCENE_HEIGHT / 2.0).to_string());

    ctx.simulations().register(SIMULATION_ID, || tracing::info!(simulation = SIMULATION_ID, "reheat"));

    let zoom = ctx.zoom(&mut surface, root, layer);
    let mut drag = ctx.drag();
    drag.bind(node, DragMode::pinned(SIMULATION_ID));
    let brush = ctx.brush(&mut surface, root, Rect::new(0.0, 0.0, SCENE_WIDTH, SCENE_HEIGHT));

    forward(zoom.events(), "zoom", log);
    forward(drag.events(), "drag", log);
    if let Some(brush) = &brush {
        forward(brush.events(), "brush", log);
    }

    Scene { surface, datums, root, background, node, zoom, drag, brush, targets: Vec::new() }
}

/// Append every event from `emitter` to `log`, tagged with `source`.
fn forward<E: Serialize + Clone + 'static>(emitter: &Emitter<E>, source: &'static str, log: &Log) {
    let sink = Rc::clone(log);
    let _subscription = emitter.subscribe(move |event: &E| match serde_json::to_value(event) {
        Ok(value) => sink.borrow_mut().push(json!({ "source": source, "data": value })),
        Err(e) => tracing::warn!(error = %e, source, "event not serializable"),
    });
}

impl Scene {
    fn element(&self, target: Target) -> ElementId {
        match target {
            Target::Root => self.root,
            Target::Background => self.background,
            Target::Node => self.node,
            Target::Overlay => self.brush.as_ref().map_or(self.root, BrushController::overlay),
        }
    }

    fn target_of(&self, pointer: PointerId) -> ElementId {
        self.targets.iter().find(|(p, _)| *p == pointer).map_or(self.root, |(_, el)| *el)
    }

    /// Route one step. Pointer-downs go to drag, then zoom, then brush; the
    /// first controller that consumes the event owns the gesture.
    fn apply(&mut self, step: Step) -> bool {
        match step {
            Step::Wheel { x, y, delta_y, ctrl } => {
                let ev = WheelEvent {
                    target: self.background,
                    position: Point::new(x, y),
                    delta_y,
                    delta_mode: DeltaMode::Pixel,
                    modifiers: Modifiers { ctrl, ..Modifiers::default() },
                };
                self.zoom.on_wheel(&mut self.surface, &ev).is_consumed()
            }
            Step::Down { pointer, target, x, y, button } => {
                let element = self.element(target);
                self.targets.retain(|(p, _)| *p != pointer);
                self.targets.push((pointer, element));
                let ev = PointerEvent { button, ..PointerEvent::new(pointer, element, Point::new(x, y)) };
                if self.drag.on_pointer_down(&mut self.surface, &mut self.datums, &ev).is_consumed() {
                    return true;
                }
                if self.zoom.on_pointer_down(&mut self.surface, &ev).is_consumed() {
                    return true;
                }
                self.brush.as_mut().is_some_and(|brush| brush.on_pointer_down(&mut self.surface, &ev).is_consumed())
            }
            Step::Move { pointer, x, y } => {
                let ev = PointerEvent::new(pointer, self.target_of(pointer), Point::new(x, y));
                let mut handled = self.drag.on_pointer_move(&mut self.surface, &mut self.datums, &ev).is_consumed();
                if let Some(brush) = &mut self.brush {
                    handled |= brush.on_pointer_move(&mut self.surface, &ev).is_consumed();
                }
                handled | self.zoom.on_pointer_move(&mut self.surface, &ev).is_consumed()
            }
            Step::Up { pointer, x, y } => {
                let ev = PointerEvent::new(pointer, self.target_of(pointer), Point::new(x, y));
                self.targets.retain(|(p, _)| *p != pointer);
                let mut handled = self.drag.on_pointer_up(&mut self.surface, &mut self.datums, &ev).is_consumed();
                if let Some(brush) = &mut self.brush {
                    handled |= brush.on_pointer_up(&mut self.surface, &ev).is_consumed();
                }
                handled | self.zoom.on_pointer_up(&mut self.surface, &ev).is_consumed()
            }
            Step::ZoomTo { k, x, y } => {
                let focal = x.zip(y).map(|(x, y)| Point::new(x, y));
                self.zoom.zoom_to(&mut self.surface, k, focal)
            }
            Step::Reset => self.zoom.reset_zoom(&mut self.surface),
        }
    }
}
