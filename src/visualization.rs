//! Step-by-step visualization of a running solver using kiss3d.

use kiss3d::prelude::*;
use tracing::warn;

use jigsaw::error::Result;
use jigsaw::geometry::SIDE_LENGTH;
use jigsaw::grid::Grid;
use jigsaw::pieces::{Direction, Piece, PieceType};
use jigsaw::solver::{SolverKind, SolverState};
use jigsaw::Solver;

/// Edge length of a rendered tile (slightly smaller than a cell for visible gaps).
const TILE_SIZE: f32 = 0.8;
const TILE_DEPTH: f32 = 0.05;
const MARKER_SIZE: f32 = 0.03;

/// Returns the display color for a piece, keyed on its type.
fn piece_color(piece: &Piece) -> Color {
    match piece.piece_type() {
        Ok(PieceType::Corner) => Color::new(1.0, 0.2, 0.2, 1.0), // red
        Ok(PieceType::Edge) => Color::new(1.0, 0.8, 0.2, 1.0),   // yellow
        Ok(PieceType::Middle) => Color::new(0.2, 0.6, 1.0, 1.0), // blue
        Err(_) => Color::new(0.6, 0.6, 0.6, 1.0),                // grey
    }
}

/// Where the side facing `dir` starts, which way it runs and which way is out,
/// in tile units relative to the tile centre.
///
/// Opposite sides run the same way so that the markers of two neighbouring
/// pieces land on top of each other.
fn side_frame(dir: Direction) -> (Vec3, Vec3, Vec3) {
    match dir {
        Direction::North => (
            Vec3::new(-0.5, 0.5, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ),
        Direction::East => (
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ),
        Direction::South => (
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ),
        Direction::West => (
            Vec3::new(-0.5, 0.5, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        ),
    }
}

/// World position of the centre of cell `(x, y)`, with the grid centred on
/// the origin and rows growing downwards.
fn cell_center(grid: &Grid, x: usize, y: usize) -> Vec3 {
    Vec3::new(
        x as f32 - (grid.width() as f32 - 1.0) / 2.0,
        (grid.height() as f32 - 1.0) / 2.0 - y as f32,
        0.0,
    )
}

/// Adds a tile and its side outline for one piece.
fn add_piece(scene: &mut SceneNode3d, center: Vec3, piece: &Piece) -> Vec<SceneNode3d> {
    let mut nodes = vec![scene
        .add_cube(TILE_SIZE, TILE_SIZE, TILE_DEPTH)
        .set_color(piece_color(piece))
        .set_position(center)];

    for dir in Direction::ALL {
        let Some(side) = piece.side(dir) else {
            continue;
        };
        let (start, along, out) = side_frame(dir);
        for point in side.points() {
            let offset = start
                + along * (point.x / SIDE_LENGTH) as f32
                + out * (point.y / SIDE_LENGTH) as f32;
            let node = scene
                .add_cube(MARKER_SIZE, MARKER_SIZE, MARKER_SIZE)
                .set_color(Color::new(1.0, 1.0, 1.0, 1.0))
                .set_position(center + offset + Vec3::new(0.0, 0.0, TILE_DEPTH));
            nodes.push(node);
        }
    }

    nodes
}

/// Builds the scene for every piece placed so far.
fn build_scene(scene: &mut SceneNode3d, grid: &Grid) -> Vec<SceneNode3d> {
    grid.placed()
        .flat_map(|(x, y, piece)| add_piece(scene, cell_center(grid, x, y), piece))
        .collect()
}

fn window_title(solver: &dyn Solver) -> String {
    let grid = solver.solution();
    format!(
        "{}x{} puzzle, {}/{} placed ({:?}) - [Right] step, [Up] run, [Down] pause, [R] restart",
        grid.width(),
        grid.height(),
        grid.placed_count(),
        grid.width() * grid.height(),
        solver.state()
    )
}

/// Opens a window that solves `pieces` one step at a time.
pub fn display(pieces: Vec<Piece>, kind: SolverKind) -> Result<()> {
    pollster::block_on(display_async(pieces, kind))
}

async fn display_async(pieces: Vec<Piece>, kind: SolverKind) -> Result<()> {
    let mut solver = kind.build();
    solver.init(pieces.clone())?;

    let mut window = Window::new(&window_title(solver.as_ref())).await;

    let mut camera = OrbitCamera3d::default();
    let grid = solver.solution();
    camera.set_dist(grid.width().max(grid.height()) as f32 * 1.5 + 2.0);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(0.0, 0.0, 20.0));

    let mut nodes: Vec<SceneNode3d> = Vec::new();
    // whether Up has set the solver running on its own
    let mut running = false;

    loop {
        let mut step = false;
        let mut restart = false;
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action == Action::Press {
                    match key {
                        Key::Right => step = true,
                        Key::Up => running = !running,
                        Key::Down => running = false,
                        Key::R => restart = true,
                        _ => {}
                    }
                }
            }
        }

        let mut needs_rebuild = false;
        if restart {
            solver.init(pieces.clone())?;
            running = false;
            needs_rebuild = true;
        }

        if (step || running) && solver.state() == SolverState::Running {
            let (x, y) = solver.cursor();
            let (width, height) = (solver.solution().width(), solver.solution().height());
            match solver.next_step() {
                Ok(_) => {
                    let grid = solver.solution();
                    if (grid.width(), grid.height()) != (width, height) {
                        // transposed; every tile moves
                        needs_rebuild = true;
                    } else if let Some(piece) = grid.get(x, y) {
                        nodes.extend(add_piece(&mut scene, cell_center(grid, x, y), piece));
                    }
                }
                Err(err) => {
                    warn!(%err, "solving stopped");
                    running = false;
                }
            }
            window.set_title(&window_title(solver.as_ref()));
        }

        if needs_rebuild {
            for mut node in nodes.drain(..) {
                node.remove();
            }
            nodes = build_scene(&mut scene, solver.solution());
            window.set_title(&window_title(solver.as_ref()));
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }

    Ok(())
}
