//! Prompt templates for the Gemini backend.
//!
//! Both prompts ask for a bare JSON object matching the analyzer reply
//! contract. The model is not trusted to comply; replies are validated by
//! `mojaz_ai::reply`.

use mojaz_ai::{ImageAnalysisRequest, TextAnalysisRequest};

// ── Text analysis ──

const TEXT_ROLE: &str = "أنت خبير في تحليل اعتراضات المخالفات المرورية السعودية.";

const TEXT_STEPS: &str = "\
الخطوة 1 - التحقق من التطابق:
هل يتحدث نص الاعتراض عن نوع المخالفة المسجلة نفسه؟
- إذا كان يتحدث عن مخالفة مختلفة تماماً فأعطه priority: \"low\" و confidence: 0
- مثال: المخالفة \"تجاوز الحد الأقصى للسرعة\" والاعتراض عن \"وقوف غير منظم\"

الخطوة 2 - تحليل القوة (عند التطابق):
- high: أدلة قوية (صور، مستندات، إيصالات، أوراق رسمية) مع حجج منطقية
- medium: حجج معقولة أو ظروف مخففة (عطل، طوارئ، خطأ في النظام)
- low: اعتذار فقط بدون أدلة أو حجج (آسف، مستعجل، متعب، نسيت)

الخطوة 3 - الأدلة:
هل يذكر النص وجود أدلة مرفقة؟ (صورة، مستند، إيصال، ورقة)

أرجع النتيجة بصيغة JSON فقط بدون أي نص إضافي:
{
  \"priority\": \"high|medium|low\",
  \"hasEvidence\": true|false,
  \"reasoning\": \"السبب بالعربية في جملة واحدة\",
  \"confidence\": 0.95
}";

pub fn text_prompt(req: &TextAnalysisRequest) -> String {
    format!(
        "{TEXT_ROLE}\n\
         قم بتحليل الاعتراض التالي:\n\
         \n\
         نوع المخالفة المسجلة: {violation}\n\
         عدد المرفقات: {attachments}\n\
         نص الاعتراض: \"{text}\"\n\
         \n\
         {TEXT_STEPS}",
        violation = req.violation_type,
        attachments = req.attachments_count,
        text = req.text,
    )
}

// ── Image analysis ──

const IMAGE_ROLE: &str = "أنت خبير في تحليل الأدلة المرفقة مع اعتراضات المخالفات المرورية السعودية.";

const IMAGE_STEPS: &str = "\
حلل الصورة المرفقة وحدد:
1. هل الصورة مرتبطة بنوع المخالفة والاعتراض؟
2. هل تحتوي على دليل واضح وقوي؟
3. ما مدى وضوح الصورة وجودتها؟
4. هل تحتوي على معلومات داعمة (تواريخ، أرقام، أختام رسمية)؟

التقييم:
- مطابقة عالية (صورة واضحة تثبت الاعتراض): bonusScore: 25
- مطابقة متوسطة (صورة مرتبطة لكن غير حاسمة): bonusScore: 10
- مطابقة ضعيفة (صورة غير واضحة أو غير مرتبطة): bonusScore: 0

أرجع النتيجة بصيغة JSON فقط:
{
  \"bonusScore\": 0,
  \"matchQuality\": \"high|medium|low\",
  \"hasEvidence\": true|false,
  \"reasoning\": \"السبب بالعربية في جملة واحدة\",
  \"details\": \"تفاصيل إضافية عن محتوى الصورة\"
}";

pub fn image_prompt(req: &ImageAnalysisRequest) -> String {
    format!(
        "{IMAGE_ROLE}\n\
         \n\
         نوع المخالفة: {violation}\n\
         نص الاعتراض: \"{text}\"\n\
         \n\
         {IMAGE_STEPS}",
        violation = req.violation_type,
        text = req.objection_text,
    )
}
