/// Repeating countdown measured in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct CountdownTimer {
    interval_secs: f32,
    elapsed_secs: f32,
    did_finish: bool,
}

impl CountdownTimer {
    pub fn new(interval_secs: f32) -> Self {
        Self {
            interval_secs: interval_secs.max(0.0),
            elapsed_secs: 0.0,
            did_finish: false,
        }
    }

    pub fn restart(&mut self) {
        self.elapsed_secs = 0.0;
        self.did_finish = false;
    }

    pub fn update(&mut self, dt: f32) {
        self.did_finish = false;
        self.elapsed_secs += dt;
        if self.elapsed_secs >= self.interval_secs {
            self.did_finish = true;
            self.elapsed_secs = 0.0;
        }
    }

    pub fn did_finish(&self) -> bool {
        self.did_finish
    }

    pub fn set_interval(&mut self, interval_secs: f32) {
        self.interval_secs = interval_secs.max(0.0);
        self.restart();
    }

    pub fn interval_secs(&self) -> f32 {
        self.interval_secs
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    pub fn seconds_to_finish(&self) -> f32 {
        self.interval_secs - self.elapsed_secs
    }
}
