use std::time::{Duration, Instant};

/// 时间跟踪作用域，按记录顺序保存各阶段耗时
pub struct TimingScope {
    start_time: Instant,
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_durations: Vec::new(),
        }
    }

    /// 记录一个已完成阶段的耗时
    pub fn record(&mut self, phase_name: &str, duration: Duration) {
        self.phase_durations.push((phase_name.to_string(), duration));
    }

    /// 获取总执行时间
    pub fn total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn phase_durations(&self) -> &[(String, Duration)] {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}
