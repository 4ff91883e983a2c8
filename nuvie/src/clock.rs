//! Game time and the timed effects the renderer cares about.

/// Effects that last a number of game turns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Magical light around the party.
    Light,
    /// Actors show through darkness.
    Infravision,
    Storm,
}

const TIMER_COUNT: usize = 3;

impl Timer {
    const fn index(self) -> usize {
        match self {
            Timer::Light => 0,
            Timer::Infravision => 1,
            Timer::Storm => 2,
        }
    }
}

/// Minutes of game time per player turn.
pub const MINUTES_PER_TURN: u32 = 1;

/// The game clock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameClock {
    hour: u8,
    minute: u8,
    day: u32,
    /// Frames since the session started; drives tile animation.
    ticks: u32,
    timers: [u16; TIMER_COUNT],
    eclipse: bool,
}

impl GameClock {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
            ..Self::default()
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Advance game time, counting timers down once per turn elapsed.
    pub fn advance_minutes(&mut self, minutes: u32) {
        let total = u32::from(self.minute) + u32::from(self.hour) * 60 + minutes;
        self.minute = (total % 60) as u8;
        self.hour = ((total / 60) % 24) as u8;
        self.day += total / (24 * 60);
        let turns = (minutes / MINUTES_PER_TURN).min(u32::from(u16::MAX)) as u16;
        for t in &mut self.timers {
            *t = t.saturating_sub(turns);
        }
    }

    pub fn advance_hours(&mut self, hours: u32) {
        self.advance_minutes(hours * 60);
    }

    pub fn set_timer(&mut self, timer: Timer, turns: u16) {
        self.timers[timer.index()] = turns;
    }

    pub fn timer(&self, timer: Timer) -> u16 {
        self.timers[timer.index()]
    }

    pub fn is_active(&self, timer: Timer) -> bool {
        self.timer(timer) > 0
    }

    pub fn set_eclipse(&mut self, eclipse: bool) {
        self.eclipse = eclipse;
    }

    pub fn eclipse(&self) -> bool {
        self.eclipse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_days() {
        let mut c = GameClock::new(23, 30);
        c.advance_minutes(45);
        assert_eq!((c.hour(), c.minute(), c.day()), (0, 15, 1));
        c.advance_hours(25);
        assert_eq!((c.hour(), c.day()), (1, 2));
    }

    #[test]
    fn test_timers_count_down() {
        let mut c = GameClock::new(12, 0);
        c.set_timer(Timer::Storm, 3);
        assert!(c.is_active(Timer::Storm));
        c.advance_minutes(2);
        assert_eq!(c.timer(Timer::Storm), 1);
        c.advance_hours(1);
        assert!(!c.is_active(Timer::Storm), "expired");
        assert!(!c.is_active(Timer::Infravision));
    }
}
