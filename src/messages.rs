//! User-facing texts and button labels.

pub const BTN_SEND_REPORT: &str = "🧾 Отправить отчет";
pub const BTN_NEXT: &str = "➡️ Дальше";
pub const BTN_BACK: &str = "↩️ Назад";
pub const BTN_SEND: &str = "➡️ Отправить";
pub const BTN_CANCEL: &str = "❌ Отменить";

pub const BTN_MORNING: &str = "☀️ Утро";
pub const BTN_EVENING: &str = "🌙 Вечер";

pub const GREETINGS: &str = "Здравствуйте! Это бот для отчетов салонов.\n\
    Нажмите «🧾 Отправить отчет», чтобы начать.";
pub const HELP: &str = "Отчет заполняется по шагам. На каждом шаге можно нажать \
    «↩️ Назад», чтобы исправить предыдущий ответ, или «❌ Отменить», чтобы начать заново.";
pub const MENU_HINT: &str = "Нажмите на кнопку «🧾 Отправить отчет»";
pub const NAV_HINT: &str = "Для возврата или отмены используйте кнопки ниже";

pub const CHOOSE_DAYTIME: &str = "Какой отчет вы хотите отправить?";
pub const CHOOSE_LOCATION: &str = "Выберите филиал:";
pub const LOCATION_NOT_FOUND: &str = "Филиал не найден!";

pub const MASTERS_QUANTITY: &str = "Сколько мастеров на смене? ";
pub const LATECOMERS: &str = "Кто из мастеров опоздал?";
pub const ABSENT: &str = "Кто из мастеров отсутствует?";
pub const OPEN_CHECK: &str = "Прикрепите фото чека открытия смены";

pub const CLIENTS_LOST: &str = "Сколько клиентов упущено? ";
pub const TOTAL_CLIENTS: &str = "Сколько всего клиентов было за день?";
pub const DAILY_EXCEL: &str = "Прикрепите фото Excel отчета за день (лицевая и обратная сторона), \
    затем нажмите «➡️ Дальше»";
pub const UPLOAD_SOLARIUM_COUNTER: &str = "Прикрепите фото счетчика солярия";
pub const Z_REPORT: &str = "Прикрепите фото Z-отчета";
pub const SBP_SUM: &str = "Введите сумму оплат по СБП";
pub const DAY_RESUME: &str = "Как прошел день?";
pub const DISGRUNTLED_CLIENTS: &str = "Были ли недовольные клиенты?";
pub const ARGUES_WITH_MASTERS: &str = "Были ли конфликты/споры с мастерами или между мастерами?";

pub const SEND_REPORT: &str = "Отчет готов. Отправить?";
pub const REPORT_COMPLETED: &str = "Отчет отправлен ✅";
pub const REPORT_CANCELED: &str = "Отчет отменен";
pub const SOMETHING_WRONG: &str = "Что-то пошло не так, попробуйте еще раз";

pub const BOT_STOPPED: &str = "Бот остановлен";

pub const MORNING_TITLE: &str = "Утренний отчет ☀️";
pub const EVENING_TITLE: &str = "Вечерний отчет 🌙";
pub const PLACEHOLDER: &str = "N/A";
