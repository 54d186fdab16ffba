use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(u64);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    stable: T,
    volatile: T,
    delay: Duration,
    generation: u64,
    pending: bool,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            stable: initial.clone(),
            volatile: initial,
            delay,
            generation: 0,
            pending: false,
        }
    }

    #[cfg(test)]
    pub fn stable(&self) -> &T {
        &self.stable
    }

    pub fn volatile(&self) -> &T {
        &self.volatile
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set(&mut self, value: T) -> Option<Token> {
        if value == self.volatile {
            return None;
        }
        self.volatile = value;
        self.generation += 1;
        self.pending = true;
        Some(Token(self.generation))
    }

    pub fn fire(&mut self, token: Token) -> Option<&T> {
        if !self.pending || token.0 != self.generation {
            return None;
        }
        self.pending = false;
        self.stable = self.volatile.clone();
        Some(&self.stable)
    }

    pub fn cancel(&mut self) {
        self.pending = false;
        self.generation += 1;
    }

    pub fn reset(&mut self, value: T) {
        self.cancel();
        self.stable = value.clone();
        self.volatile = value;
    }

    pub fn timer(&self, token: Token) -> impl Future<Output = Token> + Send + 'static {
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            token
        }
    }
}
