//! Draw-order contract between the world and a render surface
//!
//! The simulation does not know how things look. `render_world` walks the
//! world once per frame in a fixed layer order and hands each live entity to
//! the surface.

use crate::sim::{
    Bullet, Enemy, Explosive, GamePhase, Obstacle, Player, Powerup, River, Terrain, World,
};

/// Screen-space overlays drawn after all entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Minimap,
    Paused,
}

/// Per-frame presentation options that are not simulation state
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub show_minimap: bool,
}

/// A drawing backend
pub trait Surface {
    fn terrain(&mut self, terrain: Terrain, river: Option<&River>, width: f32, height: f32);
    fn obstacle(&mut self, obstacle: &Obstacle);
    /// `alpha` fades while the pickup blinks; `bob` is a vertical offset
    fn powerup(&mut self, powerup: &Powerup, alpha: f32, bob: f32);
    fn explosive(&mut self, explosive: &Explosive);
    fn player(&mut self, player: &Player);
    fn enemy(&mut self, enemy: &Enemy);
    fn bullet(&mut self, bullet: &Bullet);
    fn overlay(&mut self, overlay: Overlay, world: &World);
}

/// Draw one frame: terrain, obstacles, powerups, explosives, player, enemies,
/// bullets, then overlays
pub fn render_world(world: &World, surface: &mut dyn Surface, options: RenderOptions) {
    surface.terrain(world.terrain, world.river.as_ref(), world.width, world.height);

    for obstacle in &world.obstacles {
        surface.obstacle(obstacle);
    }
    for powerup in world.powerups.iter().filter(|p| p.active) {
        surface.powerup(powerup, powerup.alpha(), powerup.bob_offset());
    }
    // Blinking charges skip their "off" phase
    let lit = world
        .explosives
        .iter()
        .filter(|x| x.active && x.blink_visible(&world.schedule));
    for tnt in lit {
        surface.explosive(tnt);
    }
    if let Some(player) = world.player.as_ref() {
        surface.player(player);
    }
    for enemy in world.enemies.iter().filter(|e| e.is_alive()) {
        surface.enemy(enemy);
    }
    for bullet in world.bullets.iter().filter(|b| b.active) {
        surface.bullet(bullet);
    }

    if options.show_minimap {
        surface.overlay(Overlay::Minimap, world);
    }
    if world.phase == GamePhase::Paused {
        surface.overlay(Overlay::Paused, world);
    }
}

/// Character-grid surface for terminals and logs
#[derive(Debug, Clone)]
pub struct AsciiSurface {
    cols: usize,
    rows: usize,
    scale_x: f32,
    scale_y: f32,
    cells: Vec<char>,
    paused: bool,
}

impl AsciiSurface {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            scale_x: 1.0,
            scale_y: 1.0,
            cells: vec![' '; cols.max(1) * rows.max(1)],
            paused: false,
        }
    }

    fn plot(&mut self, x: f32, y: f32, glyph: char) {
        let col = (x * self.scale_x).floor();
        let row = (y * self.scale_y).floor();
        if col < 0.0 || row < 0.0 {
            return;
        }
        let (col, row) = (col as usize, row as usize);
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = glyph;
        }
    }

    pub fn glyph_at(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    /// Rows joined by newlines
    pub fn to_text(&self) -> String {
        let mut text: Vec<String> = self
            .cells
            .chunks(self.cols)
            .map(|row| row.iter().collect())
            .collect();
        if self.paused {
            text.push("-- PAUSED --".to_string());
        }
        text.join("\n")
    }
}

impl Surface for AsciiSurface {
    fn terrain(&mut self, _terrain: Terrain, river: Option<&River>, width: f32, height: f32) {
        self.scale_x = self.cols as f32 / width.max(1.0);
        self.scale_y = self.rows as f32 / height.max(1.0);
        self.cells.fill('.');
        self.paused = false;
        if let Some(river) = river {
            for point in &river.points {
                self.plot(point.x, point.y, '~');
            }
        }
    }

    fn obstacle(&mut self, obstacle: &Obstacle) {
        self.plot(obstacle.pos.x, obstacle.pos.y, '#');
    }

    fn powerup(&mut self, powerup: &Powerup, _alpha: f32, _bob: f32) {
        use crate::sim::PowerupKind;
        let glyph = match powerup.kind {
            PowerupKind::Ammo => 'a',
            PowerupKind::Health => 'h',
            PowerupKind::Life => 'l',
        };
        self.plot(powerup.pos.x, powerup.pos.y, glyph);
    }

    fn explosive(&mut self, explosive: &Explosive) {
        self.plot(explosive.pos.x, explosive.pos.y, '*');
    }

    fn player(&mut self, player: &Player) {
        self.plot(player.pos.x, player.pos.y, if player.hidden { 'p' } else { 'P' });
    }

    fn enemy(&mut self, enemy: &Enemy) {
        use crate::sim::EnemyKind;
        let glyph = match enemy.kind {
            EnemyKind::Tank => 'T',
            EnemyKind::Infantry => 'i',
        };
        self.plot(enemy.pos.x, enemy.pos.y, glyph);
    }

    fn bullet(&mut self, _bullet: &Bullet) {}

    fn overlay(&mut self, overlay: Overlay, _world: &World) {
        if overlay == Overlay::Paused {
            self.paused = true;
        }
    }
}
