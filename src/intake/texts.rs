//! User-facing wording. Menu labels double as routing keys, so they are
//! matched exactly (after trimming) by the router.

use crate::shared::UserId;

pub const MENU_PROMPT: &str = "لطفاً یکی از گزینه‌های زیر را انتخاب کنید:";

pub const LABEL_BOOKS: &str = "📚 کتاب";
pub const LABEL_PROFESSORS: &str = "👨‍🏫 اساتید";
pub const LABEL_FAQ: &str = "❓ سوالات متداول";
pub const LABEL_GAME: &str = "🎮 بازی";
pub const LABEL_SUPPORT: &str = "📞 پشتیبانی";
pub const LABEL_EXIT: &str = "🚪 خروج";

pub const MAIN_MENU_LABELS: [&str; 6] = [
    LABEL_BOOKS,
    LABEL_PROFESSORS,
    LABEL_FAQ,
    LABEL_GAME,
    LABEL_SUPPORT,
    LABEL_EXIT,
];

pub const HELP_TEXT: &str = "🤖 راهنمای بات:
/start - شروع کار با بات
/help - نمایش راهنما
/courses - کتاب
/professors - لیست اساتید
/game - شروع یک بازی ساده
/support - ارتباط با پشتیبانی
/exit - خروج";

pub const BOOKS_CHOSEN: &str = "شما گزینه 'کتاب' را انتخاب کردید.";
pub const PROFESSORS_CHOSEN: &str = "شما گزینه 'اساتید' را انتخاب کردید.";
pub const FAQ_CHOSEN: &str = "شما گزینه 'سوالات متداول' را انتخاب کردید.";
pub const GOODBYE: &str = "👋 خداحافظ! اگر نیاز داشتید، دوباره /start را ارسال کنید.";

pub const PROMPT_COURSE: &str = "لطفاً نام درس را وارد کنید:";
pub const PROMPT_INSTRUCTOR: &str = "اسم استاد را وارد کنید:";
pub const PROMPT_QUESTION: &str = "سوال خود را بنویسید:";

pub const SECTION_COURSE: &str = "درس: #";
pub const SECTION_INSTRUCTOR: &str = "🚬استاد: ";
pub const SECTION_QUESTION: &str = "❔سوال: ";
pub const CALL_TO_ACTION: &str = "⚡️ به ما بپیوندید ↙️";

pub const PREVIEW_HEADER: &str = "پیام شما به این شکل خواهد بود:";
pub const REVIEW_HEADER: &str = "فرم جدید برای تأیید:";
pub const AWAITING_REVIEW: &str = "فرم شما به ادمین ارسال شد. منتظر تأیید باشید.";

pub const BUTTON_CONFIRM: &str = "✅ تایید";
pub const BUTTON_CANCEL: &str = "❌ لغو";
pub const BUTTON_REJECT: &str = "❌ رد";

pub const DIRECT_PUBLISHED: &str = "✅ پیام شما با موفقیت به کانال ارسال شد!";
pub const DIRECT_CANCELLED: &str = "❌ ارسال پیام لغو شد.";
pub const REVIEW_PUBLISHED_SUBMITTER: &str = "✅ فرم شما تأیید و در کانال ارسال شد.";
pub const REVIEW_PUBLISHED_ADMIN: &str = "فرم تأیید و در کانال ارسال شد.";
pub const REVIEW_REJECTED_SUBMITTER: &str = "❌ فرم شما رد شد.";
pub const REVIEW_REJECTED_ADMIN: &str = "فرم رد شد.";

pub const GAME_PROMPT: &str = "به بازی خوش آمدید! عددی بین 1 تا 10 حدس بزنید.";
pub const GAME_ANSWER: &str = "5";
pub const GAME_HIT: &str = "آفرین! درست حدس زدید.";
pub const GAME_MISS: &str = "متاسفانه اشتباه حدس زدید. دوباره تلاش کنید.";

pub const SUPPORT_PROMPT: &str = "برای ارتباط با پشتیبانی، پیام خود را ارسال کنید.";
pub const SUPPORT_SENT: &str = "پیام شما به پشتیبانی ارسال شد.";

pub const NOTICE_GENERIC: &str = "⛔ مشکلی پیش آمده است. لطفاً دوباره تلاش کنید.";
pub const NOTICE_SESSION_MISSING: &str =
    "⛔ مشکلی در پردازش پیام شما پیش آمد. لطفاً دوباره تلاش کنید.";
pub const NOTICE_TRANSPORT: &str = "⛔ مشکلی در ارتباط با سرور پیام‌رسان پیش آمد.";

pub fn support_relay(user: UserId, text: &str) -> String {
    format!("پیام از کاربر {user}:\n{text}")
}
