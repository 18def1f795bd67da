//! Typewriter effect
//!
//! Cycles through a list of strings, typing one character per tick,
//! pausing at the complete string, deleting one character per tick, then
//! moving to the next string. Deleting runs faster than typing.

/// Typewriter timing, in ms per step
#[derive(Debug, Clone, Copy)]
pub struct TypewriterConfig {
    pub type_ms: f32,
    pub delete_ms: f32,
    /// Hold at the fully typed string before deleting
    pub hold_ms: f32,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            type_ms: 100.0,
            delete_ms: 50.0,
            hold_ms: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Typing,
    Holding,
    Deleting,
}

/// Tick-driven typewriter over a list of strings
#[derive(Debug, Clone)]
pub struct Typewriter {
    strings: Vec<String>,
    config: TypewriterConfig,
    string_index: usize,
    /// Displayed prefix length in characters
    char_len: usize,
    phase: Phase,
    elapsed_ms: f32,
}

impl Typewriter {
    pub fn new(strings: Vec<String>, config: TypewriterConfig) -> Self {
        Self {
            strings,
            config,
            string_index: 0,
            char_len: 0,
            phase: Phase::Typing,
            elapsed_ms: 0.0,
        }
    }

    fn current(&self) -> &str {
        self.strings
            .get(self.string_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn current_len(&self) -> usize {
        self.current().chars().count()
    }

    /// The currently displayed text
    pub fn displayed(&self) -> String {
        self.current().chars().take(self.char_len).collect()
    }

    pub fn is_deleting(&self) -> bool {
        self.phase == Phase::Deleting
    }

    pub fn string_index(&self) -> usize {
        self.string_index
    }

    fn interval_ms(&self) -> f32 {
        match self.phase {
            Phase::Typing => self.config.type_ms,
            Phase::Holding => self.config.hold_ms,
            Phase::Deleting => self.config.delete_ms,
        }
    }

    /// One step: exactly one character typed or deleted, or a phase change
    pub fn step(&mut self) {
        if self.strings.is_empty() {
            return;
        }
        match self.phase {
            Phase::Typing => {
                if self.char_len < self.current_len() {
                    self.char_len += 1;
                    if self.char_len == self.current_len() {
                        self.phase = Phase::Holding;
                    }
                } else {
                    self.phase = Phase::Holding;
                }
            }
            Phase::Holding => {
                self.phase = Phase::Deleting;
            }
            Phase::Deleting => {
                if self.char_len > 0 {
                    self.char_len -= 1;
                }
                if self.char_len == 0 {
                    self.string_index = (self.string_index + 1) % self.strings.len();
                    self.phase = Phase::Typing;
                }
            }
        }
    }

    /// Advance by wall-clock time, stepping at the current phase's cadence
    pub fn tick(&mut self, dt_ms: f32) {
        if self.strings.is_empty() {
            return;
        }
        self.elapsed_ms += dt_ms;
        while self.elapsed_ms >= self.interval_ms() {
            self.elapsed_ms -= self.interval_ms();
            self.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stepped_sequence(strings: &[&str], steps: usize) -> Vec<String> {
        let mut tw = Typewriter::new(
            strings.iter().map(|s| s.to_string()).collect(),
            TypewriterConfig::default(),
        );
        let mut seen = vec![tw.displayed()];
        for _ in 0..steps {
            tw.step();
            let text = tw.displayed();
            if *seen.last().unwrap() != text {
                seen.push(text);
            }
        }
        seen
    }

    #[test]
    fn test_full_cycle_never_skips_or_dups() {
        // Type A, hold, delete A, type BB, hold, delete BB, wrap to A
        let seen = stepped_sequence(&["A", "BB"], 9);
        assert_eq!(seen, vec!["", "A", "", "B", "BB", "B", "", "A"]);
    }

    #[test]
    fn test_single_char_progression() {
        let mut tw = Typewriter::new(vec!["Hi".into()], TypewriterConfig::default());
        tw.step();
        assert_eq!(tw.displayed(), "H");
        tw.step();
        assert_eq!(tw.displayed(), "Hi");
        assert!(!tw.is_deleting());

        // Hold, then delete
        tw.step();
        assert!(tw.is_deleting());
        tw.step();
        assert_eq!(tw.displayed(), "H");
    }

    #[test]
    fn test_deleting_faster_than_typing() {
        let config = TypewriterConfig::default();
        let mut tw = Typewriter::new(vec!["ab".into()], config);

        // 2 chars typed at 100ms each
        tw.tick(200.0);
        assert_eq!(tw.displayed(), "ab");

        // Hold 2000ms, then deletion at 50ms per char
        tw.tick(2000.0);
        assert!(tw.is_deleting());
        tw.tick(100.0);
        assert_eq!(tw.displayed(), "");
    }

    #[test]
    fn test_wraps_to_first_string() {
        let mut tw = Typewriter::new(
            vec!["A".into(), "B".into()],
            TypewriterConfig::default(),
        );
        // A cycle per string: type(1) + hold(1) + delete(1)
        for _ in 0..6 {
            tw.step();
        }
        assert_eq!(tw.string_index(), 0);
    }

    #[test]
    fn test_empty_strings_inert() {
        let mut tw = Typewriter::new(vec![], TypewriterConfig::default());
        tw.tick(10_000.0);
        assert_eq!(tw.displayed(), "");
    }

    #[test]
    fn test_multibyte_chars_counted_not_bytes() {
        let mut tw = Typewriter::new(vec!["Jo\u{e3}o".into()], TypewriterConfig::default());
        for _ in 0..4 {
            tw.step();
        }
        assert_eq!(tw.displayed(), "Jo\u{e3}o");
    }
}
