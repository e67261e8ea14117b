use crate::core::validation::{ValidationEngine, ValidationPolicy, Verdict};
use crate::domain::model::{CustomerRecord, FieldId, PredictionOutcome};
use crate::domain::ports::PredictionClient;
use crate::utils::error::{ChurnError, PredictionError, Result};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

/// 一次送出的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Predicted(PredictionOutcome),
    Failed(PredictionError),
}

impl Settlement {
    /// 給顯示層使用的結果；失敗時回傳固定的錯誤文字與空的信心值
    pub fn outcome(&self) -> PredictionOutcome {
        match self {
            Settlement::Predicted(outcome) => outcome.clone(),
            Settlement::Failed(_) => PredictionOutcome::unavailable(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Settlement::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Settled {
        settlement: Settlement,
        settled_at: DateTime<Utc>,
    },
}

impl Default for SubmissionState {
    fn default() -> Self {
        SubmissionState::Idle
    }
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }
}

/// 顯示層讀取的快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub state: SubmissionState,
    /// 最近一次結算的顯示結果。編輯欄位不會清除它。
    pub last_outcome: Option<PredictionOutcome>,
}

#[derive(Debug, Default)]
struct Inner {
    record: CustomerRecord,
    state: SubmissionState,
    last_outcome: Option<PredictionOutcome>,
}

// 請求 future 在結算前被丟棄時 (timeout、select!)，把狀態放回 Idle
struct InFlightGuard<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock_inner(self.inner);
        if inner.state.is_submitting() {
            tracing::warn!("Prediction request was cancelled before it settled");
            inner.state = SubmissionState::Idle;
        }
    }
}

// 鎖內只做記憶體操作，不會 panic，poison 時沿用原資料
fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 管理送出流程：Idle → Submitting → Settled。同一時間最多一個請求。
pub struct SubmissionController<C: PredictionClient> {
    client: C,
    validator: ValidationEngine,
    inner: Mutex<Inner>,
}

impl<C: PredictionClient> SubmissionController<C> {
    pub fn new(client: C) -> Self {
        Self::with_policy(client, ValidationPolicy::default())
    }

    pub fn with_policy(client: C, policy: ValidationPolicy) -> Self {
        Self {
            client,
            validator: ValidationEngine::new(policy),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    /// 編輯欄位。送出中的請求使用的是快照，不受影響。
    pub fn set_field(&self, field: FieldId, value: impl Into<String>) {
        let mut inner = self.lock();
        inner.record.set(field, value);
        if !inner.state.is_submitting() {
            inner.state = SubmissionState::Idle;
        }
    }

    pub fn clear_field(&self, field: FieldId) {
        let mut inner = self.lock();
        inner.record.unset(field);
        if !inner.state.is_submitting() {
            inner.state = SubmissionState::Idle;
        }
    }

    pub fn record(&self) -> CustomerRecord {
        self.lock().record.clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    pub fn view(&self) -> ViewState {
        let inner = self.lock();
        ViewState {
            state: inner.state.clone(),
            last_outcome: inner.last_outcome.clone(),
        }
    }

    /// 送出目前的紀錄。
    ///
    /// 已有請求進行中時回傳 `SubmissionInFlight`，不會發出第二個請求。
    /// 請求本身的失敗不是錯誤：它會成為 `Settlement::Failed` 並顯示固定文字。
    /// 若 future 在結算前被丟棄，狀態回到 Idle，上一次的結果保留。
    pub async fn submit(&self) -> Result<Settlement> {
        let snapshot = {
            let mut inner = self.lock();
            if inner.state.is_submitting() {
                tracing::warn!("⏳ Submission ignored: a prediction request is already in flight");
                return Err(ChurnError::SubmissionInFlight);
            }

            match self.validator.check(&inner.record) {
                Verdict::Valid => {}
                Verdict::Invalid(report) => match self.validator.policy() {
                    ValidationPolicy::Strict => {
                        tracing::warn!(
                            "❌ Record rejected: {} missing, {} malformed",
                            report.missing.len(),
                            report.malformed.len()
                        );
                        return Err(report.into_error());
                    }
                    ValidationPolicy::Permissive => {
                        tracing::warn!(
                            "Submitting with {} unset field(s), they will be sent as empty strings",
                            report.missing.len()
                        );
                    }
                },
            }

            inner.state = SubmissionState::Submitting;
            inner.record.clone()
        };

        let guard = InFlightGuard {
            inner: &self.inner,
            armed: true,
        };

        tracing::info!("🚀 Submitting customer record ({} fields set)", snapshot.set_count());
        let settlement = match self.client.predict(&snapshot).await {
            Ok(outcome) => {
                tracing::info!(
                    "✅ Prediction settled: {} ({})",
                    outcome.label,
                    outcome.confidence
                );
                Settlement::Predicted(outcome)
            }
            Err(err) => {
                tracing::warn!("❌ Prediction failed: {}", err.cause());
                Settlement::Failed(err)
            }
        };

        guard.disarm();
        let mut inner = self.lock();
        inner.last_outcome = Some(settlement.outcome());
        inner.state = SubmissionState::Settled {
            settlement: settlement.clone(),
            settled_at: Utc::now(),
        };
        Ok(settlement)
    }
}
