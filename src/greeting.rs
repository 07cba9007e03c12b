//! Greeting policy
//!
//! Maps a resolved identity to the ordered list of speech jobs for one
//! greeting event. The speech queue plays them back-to-back in this order,
//! so a person's full greeting always finishes before the next one starts.

use crate::GUEST;
use crate::speech::SpeechJob;

/// Primary greeting language (Marathi)
const LANG_PRIMARY: &str = "mr";

/// Secondary greeting language (English)
const LANG_SECONDARY: &str = "en";

/// Identity with a dedicated personal greeting
const YASH: &str = "yash";

/// Identity with a dedicated ceremonial greeting
const SANJAY_MALPANI_SIR: &str = "sanjay malpani sir";

const YASH_TRIBUTE: &str = "\n\
यश..\n\
शांत, संयमी आणि अभ्यासू वृत्ती असलेले यश.\n\
आपल्या विभागात आपले हार्दिक स्वागत आहे.\n";

const SANJAY_TRIBUTE: &str = "\n\
डॉक्टर. संजयजी मालपाणी..\n\
परम तेजस्वी, विश्वगुरु, श्रीमद्भगवद्गीताचार्य, योगमहर्षी,\n\
शिक्षण प्रसारक संस्थेचे कार्याध्यक्ष,\n\
डॉक्टर. संजयजी मालपाणी सर...\n\
जे काही करायचे ते अत्यंत भव्यदिव्य स्वरूपाचे असावे,\n\
हा त्यांचा विचारच त्यांना विश्वगुरु बनवतो.\n\
सदैव निरोगी, आनंदी आणि चिरतरुण राहण्यासाठी\n\
योग साधना करायला हवी,\n\
हा मौलिक विचार आपण आम्हाला देतात.\n\
आजच्या युवा पिढीने समाजामध्ये वावरताना\n\
सकारात्मक दृष्टिकोनाबरोबरच\n\
स्वयंशिस्तीला अत्यंत महत्त्व द्यावे,\n\
यासाठी संजुभाऊ वेळोवेळी आम्हाला मार्गदर्शन करतात.\n\
सर्वगुणसंपन्न, प्रसन्न व्यक्तिमत्त्व,\n\
सर्वांचे मार्गदर्शक,\n\
योगमहर्षी,\n\
डॉक्टर. संजय मालपाणी सर,\n\
आपले सहर्ष स्वागत आहे.\n";

/// Speech jobs for one greeting of `identity`, in playback order
#[must_use]
pub fn greetings_for(identity: &str) -> Vec<SpeechJob> {
    match identity {
        YASH => vec![
            SpeechJob::new(YASH_TRIBUTE, LANG_PRIMARY),
            SpeechJob::new("Welcome to our department, Yash", LANG_SECONDARY),
        ],
        SANJAY_MALPANI_SIR => vec![
            SpeechJob::new(SANJAY_TRIBUTE, LANG_PRIMARY),
            SpeechJob::new(
                "A warm and respectful welcome to our department, Doctor Sanjay Malpani Sir.",
                LANG_SECONDARY,
            ),
        ],
        GUEST => vec![
            SpeechJob::new("नमस्कार, आपल्या विभागात आपले स्वागत आहे", LANG_PRIMARY),
            SpeechJob::new("Welcome to our department", LANG_SECONDARY),
        ],
        name => vec![
            SpeechJob::new(
                format!("नमस्कार {name}, आपल्या विभागात आपले स्वागत आहे"),
                LANG_PRIMARY,
            ),
            SpeechJob::new(format!("Welcome to our department {name}"), LANG_SECONDARY),
        ],
    }
}
