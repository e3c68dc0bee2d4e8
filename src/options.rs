//! Game configuration options.

/// Configuration options for a daifugo room.
///
/// Use the builder pattern to customize options:
///
/// ```
/// use daifugo::GameOptions;
///
/// let options = GameOptions::default()
///     .with_min_players(3)
///     .with_max_players(5)
///     .with_seed(7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOptions {
    /// Players required before the deal may start.
    pub min_players: usize,
    /// Maximum number of seats.
    pub max_players: usize,
    /// Shuffle seed. `None` seeds from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 4,
            seed: None,
        }
    }
}

impl GameOptions {
    /// Sets the number of players needed to start.
    ///
    /// # Example
    ///
    /// ```
    /// use daifugo::GameOptions;
    ///
    /// let options = GameOptions::default().with_min_players(2);
    /// assert_eq!(options.min_players, 2);
    /// ```
    #[must_use]
    pub const fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = min_players;
        self
    }

    /// Sets the number of seats.
    ///
    /// # Example
    ///
    /// ```
    /// use daifugo::GameOptions;
    ///
    /// let options = GameOptions::default().with_max_players(5);
    /// assert_eq!(options.max_players, 5);
    /// ```
    #[must_use]
    pub const fn with_max_players(mut self, max_players: usize) -> Self {
        self.max_players = max_players;
        self
    }

    /// Fixes the shuffle seed, making deals reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use daifugo::GameOptions;
    ///
    /// let options = GameOptions::default().with_seed(42);
    /// assert_eq!(options.seed, Some(42));
    /// ```
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
