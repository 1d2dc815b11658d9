//! Interactive terminal viewer.
//!
//! Left click places the observer, middle or right click places the enemy.
//! `c`/`C`, `t`/`T` and `r`/`R` lower/raise the camera height, target height
//! and range; `m` switches the enemy update mode; `q` or `Esc` quits.

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind},
    execute, queue,
    style::Print,
    terminal::{self, ClearType},
};

use fieldsight_core::Point;
use fieldsight_los::{EnemyUpdate, SightParams, VisibilityMap};
use fieldsight_render::TerminalPreview;

const HEIGHT_STEP: f64 = 0.05;
const RANGE_STEP: f64 = 0.5;
const HELP: &str =
    "left click: observer  right/middle click: enemy  c/C t/T r/R: adjust  m: mode  q: quit";

/// A user request decoded from a terminal event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    SetObserver(Point),
    SetEnemy(Point),
    CameraHeight(f64),
    TargetHeight(f64),
    MaxRange(f64),
    ToggleMode,
    Quit,
}

/// Decode a key press.
pub fn key_action(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let action = match key.code {
        KeyCode::Char('c') => Action::CameraHeight(-HEIGHT_STEP),
        KeyCode::Char('C') => Action::CameraHeight(HEIGHT_STEP),
        KeyCode::Char('t') => Action::TargetHeight(-HEIGHT_STEP),
        KeyCode::Char('T') => Action::TargetHeight(HEIGHT_STEP),
        KeyCode::Char('r') => Action::MaxRange(-RANGE_STEP),
        KeyCode::Char('R') => Action::MaxRange(RANGE_STEP),
        KeyCode::Char('m') => Action::ToggleMode,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Decode a mouse press over the preview.
///
/// Presses outside the drawn preview (`extent` terminal cells) are ignored.
pub fn mouse_action(
    me: MouseEvent,
    preview: &TerminalPreview,
    grid_size: Point,
    extent: (u16, u16),
) -> Option<Action> {
    let MouseEventKind::Down(button) = me.kind else {
        return None;
    };
    if me.column >= extent.0 || me.row >= extent.1 {
        return None;
    }
    let cell = preview.grid_cell(grid_size, me.column, me.row);
    let cell = Point::new(cell.x.min(grid_size.x - 1), cell.y.min(grid_size.y - 1));
    match button {
        MouseButton::Left => Some(Action::SetObserver(cell)),
        MouseButton::Middle | MouseButton::Right => Some(Action::SetEnemy(cell)),
    }
}

/// Restores the terminal when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All),
            event::EnableMouseCapture
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Drives a [`VisibilityMap`] from terminal input.
pub struct Viewer {
    map: VisibilityMap,
    preview: TerminalPreview,
    extent: (u16, u16),
}

impl Viewer {
    pub fn new(map: VisibilityMap, preview: TerminalPreview) -> Self {
        Self {
            map,
            preview,
            extent: (0, 0),
        }
    }

    pub fn map(&self) -> &VisibilityMap {
        &self.map
    }

    /// Apply one action. Returns `false` when the viewer should quit.
    ///
    /// Parameter edits are clamped to the slider ranges.
    pub fn apply(&mut self, action: Action) -> bool {
        let p = self.map.params();
        match action {
            Action::SetObserver(cell) => self.map.set_observer(cell),
            Action::SetEnemy(cell) => self.map.set_enemy(cell),
            Action::CameraHeight(d) => self.set_params(SightParams {
                camera_height: p.camera_height + d,
                ..p
            }),
            Action::TargetHeight(d) => self.set_params(SightParams {
                target_height: p.target_height + d,
                ..p
            }),
            Action::MaxRange(d) => self.set_params(SightParams {
                max_range: p.max_range + d,
                ..p
            }),
            Action::ToggleMode => {
                let mode = match self.map.enemy_update() {
                    EnemyUpdate::FullRecompute => EnemyUpdate::LinePatch,
                    EnemyUpdate::LinePatch => EnemyUpdate::FullRecompute,
                };
                log::debug!("enemy update mode: {mode:?}");
                self.map.set_enemy_update(mode);
            }
            Action::Quit => return false,
        }
        true
    }

    fn set_params(&mut self, params: SightParams) {
        self.map.set_params(params.clamped());
    }

    /// One-line description of the current state.
    pub fn status(&self) -> String {
        let p = self.map.params();
        let mode = match self.map.enemy_update() {
            EnemyUpdate::FullRecompute => "full",
            EnemyUpdate::LinePatch => "line patch",
        };
        let duel = match self.map.duel() {
            Some(d) => format!(
                "hit {} | seen {}",
                yes_no(d.observer_hits_enemy),
                yes_no(d.enemy_sees_observer)
            ),
            None => "no field".to_string(),
        };
        format!(
            "camera {:.2} m  target {:.2} m  range {:.1} m  [{mode}]  observer {}  enemy {}  \
             {duel}",
            p.camera_height,
            p.target_height,
            p.max_range,
            self.map.observer(),
            self.map.enemy(),
        )
    }

    fn draw<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        queue!(out, terminal::Clear(ClearType::All))?;
        let Some(grids) = self.map.grids() else {
            queue!(out, cursor::MoveTo(0, 0), Print(self.status()))?;
            return out.flush();
        };
        let rows = self
            .preview
            .rows(grids, Some(self.map.observer()), Some(self.map.enemy()));
        let width = rows.first().map_or(0, Vec::len);
        self.extent = (width as u16, rows.len() as u16);
        for (y, row) in rows.iter().enumerate() {
            queue!(out, cursor::MoveTo(0, y as u16))?;
            self.preview.queue_row(out, row)?;
        }
        queue!(
            out,
            cursor::MoveTo(0, self.extent.1 + 1),
            Print(self.status()),
            cursor::MoveTo(0, self.extent.1 + 2),
            Print(HELP)
        )?;
        out.flush()
    }

    /// Run until the user quits. The terminal is restored on every exit path.
    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        let _guard = TerminalGuard::enter()?;
        let mut stdout = io::stdout();
        self.draw(&mut stdout)?;
        loop {
            let action = match event::read()? {
                Event::Key(key) => key_action(key),
                Event::Mouse(me) => {
                    let size = self.map.mapper().grid_size();
                    mouse_action(me, &self.preview, size, self.extent)
                }
                Event::Resize(..) => {
                    self.draw(&mut stdout)?;
                    None
                }
                _ => None,
            };
            let Some(action) = action else {
                continue;
            };
            if !self.apply(action) {
                break;
            }
            self.draw(&mut stdout)?;
        }
        Ok(())
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}
