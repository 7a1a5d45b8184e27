// Game state and the reversible tick simulator
//
// The search never clones a Game. It applies a tick, looks at the result and
// revokes it again, so every mutation made by `apply_tick` goes through a
// logging helper that first records the old value in the open diff record.

use std::collections::VecDeque;

use crate::config::RulesConfig;
use crate::field::Field;
use crate::types::{Action, Cell, ObjectTag, Point};

/// Everything known about one snake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnakeInfo {
    pub id: i32,
    pub alive: bool,
    pub name: String,
    pub score: i32,
    pub last_action: Action,
    pub shield_cooldown: u32,
    pub shield_time: u32,
    /// Head first, tail last
    pub body: VecDeque<Point>,
}

impl SnakeInfo {
    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn is_shielded(&self) -> bool {
        self.shield_time > 0
    }
}

/// Why a snake died during a simulated tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    OffGrid,
    Wall,
    Body,
    HeadToHead,
    ShieldReuse,
    OutOfTicks,
}

/// Deaths produced by one `apply_tick`, in snake-index order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub deaths: Vec<(usize, DeathCause)>,
}

impl TickOutcome {
    pub fn cause_of(&self, index: usize) -> Option<DeathCause> {
        self.deaths
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, cause)| *cause)
    }

    pub fn died(&self, index: usize) -> bool {
        self.cause_of(index).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnakeField {
    Alive(bool),
    Score(i32),
    LastAction(Action),
    ShieldCooldown(u32),
    ShieldTime(u32),
}

/// A single undoable write, holding what was there before
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Cell { at: Point, old: Cell },
    Snake { index: usize, old: SnakeField },
    PushFront { index: usize },
    PushBack { index: usize },
    PopBack { index: usize, point: Point },
    RemainingTicks { old: u32 },
}

/// All changes of one simulated tick in application order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DiffRecord {
    changes: Vec<Change>,
}

/// Full board state seen by the controlled snake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub remaining_ticks: u32,
    /// Index of the controlled snake in `snakes`
    pub me: usize,
    pub snakes: Vec<SnakeInfo>,
    pub cells: Field<Cell>,
    history: Vec<DiffRecord>,
}

impl Game {
    /// Creates an empty board
    pub fn new(height: usize, width: usize, remaining_ticks: u32, me: usize) -> Self {
        Game {
            remaining_ticks,
            me,
            snakes: Vec::new(),
            cells: Field::new(height, width),
            history: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn my_snake(&self) -> &SnakeInfo {
        &self.snakes[self.me]
    }

    /// Number of ticks currently applied and not yet revoked
    pub fn pending_ticks(&self) -> usize {
        self.history.len()
    }

    /// Puts an object on the map while building the state
    pub fn place_object(&mut self, at: Point, object: ObjectTag) -> Result<(), String> {
        if !self.cells.contains(at) {
            return Err(format!("object at {:?} is outside the board", at));
        }
        self.cells[at].object = object;
        Ok(())
    }

    /// Registers a snake and its occupancy while building the state
    pub fn add_snake(&mut self, snake: SnakeInfo) -> Result<usize, String> {
        if snake.body.is_empty() {
            return Err(format!("snake {} has an empty body", snake.id));
        }
        if let Some(p) = snake.body.iter().find(|p| !self.cells.contains(**p)) {
            return Err(format!("snake {} has body point {:?} outside the board", snake.id, p));
        }
        let index = self.snakes.len();
        if snake.alive {
            // Head written last so it always references this snake
            for p in snake.body.iter().rev() {
                self.cells[*p].snake = Some(index);
            }
        }
        self.snakes.push(snake);
        Ok(index)
    }

    /// Direction of the snake's most recent movement
    ///
    /// Falls back to the head/neck geometry when the last action was a shield.
    pub fn heading(&self, index: usize) -> Option<Action> {
        let snake = &self.snakes[index];
        if snake.last_action.is_move() {
            return Some(snake.last_action);
        }
        if snake.body.len() >= 2 {
            return Action::between(snake.body[1], snake.body[0]);
        }
        None
    }

    /// Action assumed for a snake nobody chose one for
    pub fn default_action(&self, index: usize) -> Action {
        self.heading(index).unwrap_or(Action::Left)
    }

    /// Whether `index` may legally take `action` this tick
    pub fn can_act(&self, index: usize, action: Action, rules: &RulesConfig) -> bool {
        let snake = &self.snakes[index];
        if !snake.alive || self.remaining_ticks == 0 {
            return false;
        }
        if action == Action::Shield {
            return snake.shield_cooldown == 0 && snake.score >= rules.shield_cost;
        }
        if self.heading(index).and_then(Action::opposite) == Some(action) {
            return false;
        }
        match self.cells.get(action.apply(snake.head())) {
            None => false,
            Some(cell) => {
                cell.object != ObjectTag::Wall && cell.snake.map_or(true, |owner| owner == index)
            }
        }
    }

    /// Every action `index` may legally take, in `Action::ALL` order
    pub fn legal_actions(&self, index: usize, rules: &RulesConfig) -> Vec<Action> {
        Action::ALL
            .iter()
            .copied()
            .filter(|a| self.can_act(index, *a, rules))
            .collect()
    }

    /// Advances every snake by one action simultaneously
    ///
    /// `actions[i]` belongs to snake `i`; missing entries fall back to
    /// `default_action`. The tick is recorded so `revoke_tick` can undo it.
    pub fn apply_tick(&mut self, actions: &[Action], rules: &RulesConfig) -> TickOutcome {
        self.history.push(DiffRecord::default());

        let count = self.snakes.len();
        let actions: Vec<Action> = (0..count)
            .map(|i| actions.get(i).copied().unwrap_or_else(|| self.default_action(i)))
            .collect();
        let mut dying: Vec<Option<DeathCause>> = vec![None; count];

        let out_of_ticks = self.remaining_ticks == 0;
        if !out_of_ticks {
            self.set_remaining_ticks(self.remaining_ticks - 1);
        }

        for i in 0..count {
            if !self.snakes[i].alive {
                continue;
            }
            if out_of_ticks {
                dying[i] = Some(DeathCause::OutOfTicks);
            } else if actions[i] == Action::Shield {
                self.activate_shield(i, rules, &mut dying);
            }
        }

        // Movement: compute heads, then pop every tail before any head lands
        let mut moved: Vec<(usize, Point, Action)> = Vec::new();
        for i in 0..count {
            let action = actions[i];
            if !self.snakes[i].alive || dying[i].is_some() || !action.is_move() {
                continue;
            }
            let snake = &self.snakes[i];
            let (time, cooldown) = (snake.shield_time, snake.shield_cooldown);
            let head = action.apply(snake.head());
            if time > 0 {
                self.set_snake(i, SnakeField::ShieldTime(time - 1));
            }
            if cooldown > 0 {
                self.set_snake(i, SnakeField::ShieldCooldown(cooldown - 1));
            }
            self.set_snake(i, SnakeField::LastAction(action));
            if !self.cells.contains(head) {
                dying[i] = Some(DeathCause::OffGrid);
                continue;
            }
            moved.push((i, head, action));
        }
        for &(i, _, _) in &moved {
            if let Some(tail) = self.pop_back(i) {
                self.refresh_occupant(tail);
            }
        }
        for &(i, head, _) in &moved {
            self.push_front(i, head);
            let cell = self.cells[head];
            self.set_cell(head, Cell { snake: Some(i), ..cell });
        }

        // Landing
        let mut growth = vec![0usize; count];
        for &(i, head, _) in &moved {
            let cell = self.cells[head];
            match cell.object {
                ObjectTag::Score(value) => {
                    self.add_score(i, value as i32);
                    self.set_cell(head, Cell { object: ObjectTag::None, ..cell });
                }
                ObjectTag::Growth => {
                    growth[i] += rules.growth_per_item;
                    self.set_cell(head, Cell { object: ObjectTag::None, ..cell });
                }
                ObjectTag::Trap => self.add_score(i, -rules.trap_penalty),
                ObjectTag::Wall => dying[i] = Some(DeathCause::Wall),
                ObjectTag::None => {}
            }
        }

        for &(i, _, action) in &moved {
            if dying[i].is_some() {
                continue;
            }
            for _ in 0..growth[i] {
                match self.extension_point(i, action) {
                    Some(tail) => {
                        self.push_back(i, tail);
                        let cell = self.cells[tail];
                        if cell.snake.is_none() {
                            self.set_cell(tail, Cell { snake: Some(i), ..cell });
                        }
                    }
                    None => break,
                }
            }
        }

        // Collisions are judged after everyone has moved
        for i in 0..count {
            let snake = &self.snakes[i];
            if !snake.alive || dying[i].is_some() || snake.is_shielded() {
                continue;
            }
            let head = snake.head();
            for (j, other) in self.snakes.iter().enumerate() {
                if j == i || !other.alive || !other.body.contains(&head) {
                    continue;
                }
                let cause = if other.head() == head {
                    DeathCause::HeadToHead
                } else {
                    DeathCause::Body
                };
                if dying[i] != Some(DeathCause::HeadToHead) {
                    dying[i] = Some(cause);
                }
            }
        }

        let mut outcome = TickOutcome::default();
        for (i, cause) in dying.into_iter().enumerate() {
            if let Some(cause) = cause {
                self.kill(i, rules);
                outcome.deaths.push((i, cause));
            }
        }
        outcome
    }

    /// Undoes the most recent `apply_tick`
    ///
    /// # Panics
    /// Panics when no tick is pending.
    pub fn revoke_tick(&mut self) {
        let record = self
            .history
            .pop()
            .expect("revoke_tick called without a pending apply_tick");
        for change in record.changes.into_iter().rev() {
            match change {
                Change::Cell { at, old } => self.cells[at] = old,
                Change::Snake { index, old } => {
                    let snake = &mut self.snakes[index];
                    match old {
                        SnakeField::Alive(v) => snake.alive = v,
                        SnakeField::Score(v) => snake.score = v,
                        SnakeField::LastAction(v) => snake.last_action = v,
                        SnakeField::ShieldCooldown(v) => snake.shield_cooldown = v,
                        SnakeField::ShieldTime(v) => snake.shield_time = v,
                    }
                }
                Change::PushFront { index } => {
                    self.snakes[index].body.pop_front();
                }
                Change::PushBack { index } => {
                    self.snakes[index].body.pop_back();
                }
                Change::PopBack { index, point } => self.snakes[index].body.push_back(point),
                Change::RemainingTicks { old } => self.remaining_ticks = old,
            }
        }
    }

    fn activate_shield(&mut self, i: usize, rules: &RulesConfig, dying: &mut [Option<DeathCause>]) {
        self.set_snake(i, SnakeField::LastAction(Action::Shield));
        if self.snakes[i].is_shielded() {
            dying[i] = Some(DeathCause::ShieldReuse);
            return;
        }
        self.set_snake(i, SnakeField::ShieldTime(rules.shield_duration));
        self.set_snake(i, SnakeField::ShieldCooldown(rules.shield_cooldown_ticks));
        self.add_score(i, -rules.shield_cost);
    }

    /// Cell a growing snake's tail extends into
    ///
    /// Continues straight past the tail, turning when that leaves the board.
    fn extension_point(&self, i: usize, moved: Action) -> Option<Point> {
        let body = &self.snakes[i].body;
        let tail = body[body.len() - 1];
        let straight = if body.len() >= 2 {
            Action::between(body[body.len() - 2], tail)
        } else {
            None
        }
        .or_else(|| moved.opposite())?;

        let [turn_a, turn_b] = straight.perpendicular();
        [straight, turn_a, turn_b]
            .iter()
            .map(|dir| dir.apply(tail))
            .find(|p| self.cells.contains(*p))
    }

    /// Turns a dead snake into score droplets and releases its cells
    fn kill(&mut self, i: usize, rules: &RulesConfig) {
        let body: Vec<Point> = self.snakes[i].body.iter().copied().collect();
        let mut remaining = self.snakes[i].score;
        for &p in &body {
            if remaining <= 0 {
                break;
            }
            let cell = self.cells[p];
            if cell.object != ObjectTag::None {
                continue;
            }
            let drop = remaining.min(rules.droplet_cap as i32);
            self.set_cell(p, Cell { object: ObjectTag::Score(drop as u8), ..cell });
            remaining -= drop;
        }
        self.set_snake(i, SnakeField::Alive(false));
        for p in body {
            self.refresh_occupant(p);
        }
    }

    /// Points the cell's occupant at a living snake still covering it, if any
    fn refresh_occupant(&mut self, at: Point) {
        let cell = self.cells[at];
        if let Some(owner) = cell.snake {
            let snake = &self.snakes[owner];
            if snake.alive && snake.body.contains(&at) {
                return;
            }
        }
        let occupant = self
            .snakes
            .iter()
            .position(|s| s.alive && s.body.contains(&at));
        if occupant != cell.snake {
            self.set_cell(at, Cell { snake: occupant, ..cell });
        }
    }

    fn record(&mut self, change: Change) {
        if let Some(record) = self.history.last_mut() {
            record.changes.push(change);
        }
    }

    fn set_cell(&mut self, at: Point, cell: Cell) {
        let old = self.cells[at];
        self.record(Change::Cell { at, old });
        self.cells[at] = cell;
    }

    fn set_snake(&mut self, index: usize, value: SnakeField) {
        let snake = &self.snakes[index];
        let old = match value {
            SnakeField::Alive(_) => SnakeField::Alive(snake.alive),
            SnakeField::Score(_) => SnakeField::Score(snake.score),
            SnakeField::LastAction(_) => SnakeField::LastAction(snake.last_action),
            SnakeField::ShieldCooldown(_) => SnakeField::ShieldCooldown(snake.shield_cooldown),
            SnakeField::ShieldTime(_) => SnakeField::ShieldTime(snake.shield_time),
        };
        self.record(Change::Snake { index, old });
        let snake = &mut self.snakes[index];
        match value {
            SnakeField::Alive(v) => snake.alive = v,
            SnakeField::Score(v) => snake.score = v,
            SnakeField::LastAction(v) => snake.last_action = v,
            SnakeField::ShieldCooldown(v) => snake.shield_cooldown = v,
            SnakeField::ShieldTime(v) => snake.shield_time = v,
        }
    }

    fn add_score(&mut self, index: usize, delta: i32) {
        let score = self.snakes[index].score;
        self.set_snake(index, SnakeField::Score(score + delta));
    }

    fn set_remaining_ticks(&mut self, value: u32) {
        let old = self.remaining_ticks;
        self.record(Change::RemainingTicks { old });
        self.remaining_ticks = value;
    }

    fn push_front(&mut self, index: usize, point: Point) {
        self.record(Change::PushFront { index });
        self.snakes[index].body.push_front(point);
    }

    fn push_back(&mut self, index: usize, point: Point) {
        self.record(Change::PushBack { index });
        self.snakes[index].body.push_back(point);
    }

    fn pop_back(&mut self, index: usize) -> Option<Point> {
        let point = self.snakes[index].body.pop_back()?;
        self.record(Change::PopBack { index, point });
        Some(point)
    }
}
