//! 全局提示条
//!
//! 同一时间只显示一条提示，新提示覆盖旧提示，到时自动消失。

use std::time::Duration;

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    fn alert_class(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "alert alert-info shadow-lg",
            NoticeLevel::Success => "alert alert-success shadow-lg",
            NoticeLevel::Error => "alert alert-error shadow-lg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// 递增序号，用来判断定时器清除的是不是同一条提示
    seq: u64,
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Clone, Copy)]
pub struct Notifier {
    current: RwSignal<Option<Notice>>,
    seq: StoredValue<u64>,
    timeout_ms: u32,
}

impl Notifier {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            current: RwSignal::new(None),
            seq: StoredValue::new(0),
            timeout_ms,
        }
    }

    pub fn current(&self) -> ReadSignal<Option<Notice>> {
        self.current.read_only()
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(NoticeLevel::Info, text.into());
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(NoticeLevel::Success, text.into());
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(NoticeLevel::Error, text.into());
    }

    pub fn dismiss(&self) {
        self.current.try_set(None);
    }

    fn show(&self, level: NoticeLevel, text: String) {
        let Some(seq) = self.seq.try_update_value(|seq| {
            *seq += 1;
            *seq
        }) else {
            return;
        };
        self.current.try_set(Some(Notice { seq, level, text }));

        // 到时只清除自己这条
        let current = self.current;
        set_timeout(
            move || {
                current.try_update(|notice| {
                    if notice.as_ref().is_some_and(|n| n.seq == seq) {
                        *notice = None;
                    }
                });
            },
            Duration::from_millis(u64::from(self.timeout_ms)),
        );
    }
}

/// 从 Context 获取提示服务
pub fn use_notifier() -> Notifier {
    use_context::<Notifier>().expect("Notifier should be provided")
}

#[component]
pub fn NoticeToast() -> impl IntoView {
    let notifier = use_notifier();
    let current = notifier.current();

    view! {
        {move || current.get().map(|notice| view! {
            <div class="toast toast-top toast-end z-50">
                <div class=notice.level.alert_class() role="alert">
                    <span>{notice.text}</span>
                    <button class="btn btn-ghost btn-xs" on:click=move |_| notifier.dismiss()>"✕"</button>
                </div>
            </div>
        })}
    }
}
