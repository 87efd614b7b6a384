//! Prompt composition.
//!
//! Everything here is pure: the same history, text, mode and settings always
//! produce the same request.

use crate::client::{CompletionRequest, GenerationParams, Turn};
use crate::core::message::{Message, Mode, Role};
use crate::core::settings::{AuthorLevel, ResponseLength, WritingSettings};

/// Persona and house rules sent as the system instruction.
pub const SYSTEM_INSTRUCTION: &str = "\
BẠN LÀ: \"TRỢ LÝ SÁNG TÁC & ĐỌC TRUYỆN\" của ứng dụng Ink & Mind.

MỤC TIÊU: hỗ trợ người dùng trong toàn bộ vòng đời sáng tác và đọc truyện.

QUY TẮC TỐI THƯỢNG KHI NGƯỜI DÙNG YÊU CẦU TẠO TRUYỆN MỚI:
Chỉ trả về đúng định dạng sau, không thêm lời dẫn hay lời chào:

# [TÊN TRUYỆN ĐƯỢC ĐỀ XUẤT]

**Thể loại:** [Thể loại chính]
**Giới thiệu:**
[Tóm tắt hấp dẫn, giới thiệu nhân vật chính và xung đột chính, khoảng 100-200 từ.]

Không viết ngay Chương 1 và không hỏi lại người dùng.

NGUYÊN TẮC:
1. Luôn ưu tiên ý định của người dùng.
2. Trả lời mạch lạc, chia đoạn rõ ràng.

CÁC CHẾ ĐỘ LÀM VIỆC:
- CREATIVE: viết truyện, chương, đoạn, hội thoại.
- EDITOR: chỉnh sửa câu chữ mượt hơn.
- STRUCTURE: tạo dàn ý, sắp xếp chương.
- READER: tóm tắt chương, giải thích tình tiết.
- UTILITY: gợi ý tiêu đề, mô tả.

AN TOÀN NỘI DUNG:
Tuyệt đối không tạo nội dung vi phạm pháp luật, khiêu dâm trẻ em, bạo lực cực đoan.";

/// Phrases that mark a request to start a new story (matched lowercase).
pub const CREATION_TRIGGERS: &[&str] = &[
    "tạo truyện",
    "sáng tác",
    "ý tưởng truyện",
    "lập dàn ý",
    "tiểu thuyết",
    "novel",
    "create story",
    "write story",
    "new story",
    "outline",
];

/// Strict output format for new-story requests.
pub const CREATION_DIRECTIVE: &str = "\
YÊU CẦU ĐẶC BIỆT: Người dùng đang yêu cầu TẠO TRUYỆN MỚI.
Hãy trả về kết quả CHỈ bao gồm 3 phần sau, không được phép có lời chào hay lời dẫn:
1. Tên truyện (Viết dạng Tiêu đề lớn Markdown #)
2. Thể loại (In đậm)
3. Giới thiệu nội dung (Tóm tắt hấp dẫn)
KHÔNG VIẾT NỘI DUNG TRUYỆN HAY CHƯƠNG 1 LÚC NÀY.";

/// Output cap for short replies.
pub const SHORT_OUTPUT_TOKENS: u32 = 1024;

/// Output cap for every other length.
pub const LONG_OUTPUT_TOKENS: u32 = 8192;

/// Temperature used when compiling a manuscript.
const COMPILE_TEMPERATURE: f64 = 0.3;

const AUTHOR_LEVEL_PROMPTS: [(AuthorLevel, &str); 3] = [
    (
        AuthorLevel::Beginner,
        "Sử dụng từ ngữ đơn giản, dễ hiểu. Cấu trúc câu ngắn gọn, trực diện. Tập trung vào hành động rõ ràng, ít ẩn dụ phức tạp.",
    ),
    (
        AuthorLevel::Professional,
        "Văn phong chuyên nghiệp, mượt mà. Sử dụng kỹ thuật 'Show, don't tell'. Từ vựng phong phú nhưng không rườm rà. Cấu trúc câu đa dạng, nhịp điệu tốt.",
    ),
    (
        AuthorLevel::Legendary,
        "Phong cách văn học nghệ thuật cao. Sử dụng nhiều biện pháp tu từ, ẩn dụ sâu sắc. Mô tả tâm lý nhân vật tinh tế, bối cảnh giàu hình ảnh. Văn phong mang tính triết lý và chiêm nghiệm.",
    ),
];

/// Fixed instruction text for a preset author level. `Custom` has none.
#[must_use]
pub fn author_level_prompt(level: AuthorLevel) -> Option<&'static str> {
    AUTHOR_LEVEL_PROMPTS
        .iter()
        .find(|(l, _)| *l == level)
        .map(|(_, prompt)| *prompt)
}

/// Resolve the style instruction for the configured author level.
#[must_use]
pub fn style_instruction(settings: &WritingSettings) -> String {
    match author_level_prompt(settings.author_level) {
        Some(prompt) => format!(
            "[TRÌNH ĐỘ TÁC GIẢ - {}]: {prompt}",
            settings.author_level
        ),
        None => format!(
            "[CHỈ THỊ ĐẶC BIỆT CỦA NGƯỜI DÙNG]: {}",
            settings.custom_instructions
        ),
    }
}

/// Whether the text asks for a brand-new story.
#[must_use]
pub fn is_creation_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    CREATION_TRIGGERS.iter().any(|trigger| lower.contains(trigger))
}

/// Block describing tone, point of view, length and style.
#[must_use]
pub fn settings_context(settings: &WritingSettings) -> String {
    format!(
        "[CẤU HÌNH SÁNG TÁC]:\n\
         - Giọng văn (Tone): {}\n\
         - Ngôi kể (POV): {}\n\
         - Độ dài phản hồi: {}\n\
         {}",
        settings.tone,
        settings.pov,
        settings.response_length,
        style_instruction(settings)
    )
}

/// Output cap for a response length.
#[must_use]
pub fn max_output_tokens(length: ResponseLength) -> u32 {
    match length {
        ResponseLength::Short => SHORT_OUTPUT_TOKENS,
        ResponseLength::Medium | ResponseLength::Long => LONG_OUTPUT_TOKENS,
    }
}

fn to_turn(message: &Message) -> Turn {
    match message.role {
        Role::User => Turn::user(message.text.clone()),
        Role::Model => Turn::model(message.text.clone()),
    }
}

/// Compose the request for a new user message.
///
/// `history` must not already contain the new message.
#[must_use]
pub fn compose(
    history: &[Message],
    new_user_text: &str,
    mode: Mode,
    settings: &WritingSettings,
) -> CompletionRequest {
    let mut sections = vec![settings_context(settings)];
    if is_creation_request(new_user_text) {
        sections.push(CREATION_DIRECTIVE.to_string());
    }
    sections.push(format!(
        "[BẠN ĐANG Ở: {}]. Hãy thực hiện yêu cầu sau: {new_user_text}",
        mode.tag()
    ));

    let mut turns: Vec<Turn> = history.iter().map(to_turn).collect();
    turns.push(Turn::user(sections.join("\n\n")));

    CompletionRequest {
        system_instruction: Some(SYSTEM_INSTRUCTION.to_string()),
        turns,
        params: GenerationParams {
            temperature: settings.creativity_level,
            max_output_tokens: max_output_tokens(settings.response_length),
        },
    }
}

/// Compose a request that edits the whole conversation into one manuscript.
#[must_use]
pub fn compose_compilation(history: &[Message]) -> CompletionRequest {
    let conversation = history
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => "USER",
                Role::Model => "AI",
            };
            format!("{speaker}: {}", m.text)
        })
        .collect::<Vec<_>>()
        .join("\n---\n");

    let prompt = format!(
        "Bạn là một Biên tập viên Văn học cao cấp. Nhiệm vụ của bạn là TỔNG HỢP và BIÊN TẬP lại \
         toàn bộ nội dung sáng tác từ lịch sử cuộc trò chuyện dưới đây thành một tác phẩm hoàn chỉnh \
         để xuất bản.

Dưới đây là lịch sử trò chuyện:
{conversation}

YÊU CẦU XỬ LÝ:
1. LỌC BỎ HOÀN TOÀN các câu giao tiếp xã giao, các yêu cầu của người dùng và các lời dẫn thừa của AI.
2. GIỮ LẠI VÀ KẾT NỐI phần văn bản truyện, các chương, các đoạn mô tả thành một luồng liền mạch.
3. TRÍCH XUẤT: tự đặt Tên truyện (nếu chưa có), xác định Thể loại, viết một Giới thiệu hấp dẫn.

ĐỊNH DẠNG ĐẦU RA (Markdown):
# [TÊN TRUYỆN]

**Thể loại:** [Thể loại]
**Giới thiệu:**
[Đoạn giới thiệu nội dung]

---

## Nội dung chính

[Toàn bộ nội dung truyện đã được làm sạch và ghép nối]"
    );

    CompletionRequest {
        system_instruction: None,
        turns: vec![Turn::user(prompt)],
        params: GenerationParams {
            temperature: COMPILE_TEMPERATURE,
            max_output_tokens: LONG_OUTPUT_TOKENS,
        },
    }
}
