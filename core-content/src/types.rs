//! Wire types of the supported content sources.

use serde::Deserialize;
use std::collections::BTreeMap;

// ============================================================================
// alquran.cloud
// ============================================================================

/// Envelope shared by every alquran.cloud response.
#[derive(Debug, Deserialize)]
pub struct CloudEnvelope<T> {
    pub code: u16,
    #[serde(default)]
    pub status: String,
    pub data: T,
}

/// `GET /meta` payload.
#[derive(Debug, Deserialize)]
pub struct CloudMeta {
    pub surahs: CloudSurahIndex,
}

#[derive(Debug, Deserialize)]
pub struct CloudSurahIndex {
    #[serde(default)]
    pub count: Option<u16>,
    pub references: Vec<CloudSurah>,
}

/// Chapter reference as listed by `/meta`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSurah {
    pub number: u16,
    pub name: String,
    pub english_name: String,
    pub english_name_translation: String,
    pub number_of_ayahs: u16,
    pub revelation_type: String,
}

/// `GET /surah/{n}/{edition}` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSurahEdition {
    pub number: u16,
    pub name: String,
    pub english_name: String,
    pub english_name_translation: String,
    pub number_of_ayahs: u16,
    pub revelation_type: String,
    pub ayahs: Vec<CloudAyah>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAyah {
    /// Global verse number.
    pub number: u32,
    pub text: String,
    pub number_in_surah: u16,
    #[serde(default)]
    pub juz: Option<u8>,
    #[serde(default)]
    pub page: Option<u16>,
    /// Present on audio editions only.
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub audio_secondary: Vec<String>,
}

// ============================================================================
// equran.id (v2)
// ============================================================================

/// Envelope shared by every equran.id response.
#[derive(Debug, Deserialize)]
pub struct EquranEnvelope<T> {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Chapter entry of `GET /surat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquranSurat {
    pub nomor: u16,
    pub nama: String,
    pub nama_latin: String,
    pub jumlah_ayat: u16,
    pub tempat_turun: String,
    pub arti: String,
    /// Reciter key (`"01"`, `"02"`, ...) to full-chapter audio URL.
    #[serde(default)]
    pub audio_full: BTreeMap<String, String>,
}

/// `GET /surat/{n}` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquranSuratDetail {
    #[serde(flatten)]
    pub surat: EquranSurat,
    pub ayat: Vec<EquranAyat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquranAyat {
    pub nomor_ayat: u16,
    pub teks_arab: String,
    #[serde(default)]
    pub teks_latin: Option<String>,
    #[serde(default)]
    pub teks_indonesia: Option<String>,
    /// Reciter key to per-verse audio URL.
    #[serde(default)]
    pub audio: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cloud_meta() {
        let json = r#"{
            "code": 200,
            "status": "OK",
            "data": {
                "surahs": {
                    "count": 114,
                    "references": [
                        {
                            "number": 1,
                            "name": "سُورَةُ ٱلْفَاتِحَةِ",
                            "englishName": "Al-Faatiha",
                            "englishNameTranslation": "The Opening",
                            "numberOfAyahs": 7,
                            "revelationType": "Meccan"
                        }
                    ]
                },
                "juzs": { "count": 30 }
            }
        }"#;

        let envelope: CloudEnvelope<CloudMeta> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 200);
        assert_eq!(envelope.data.surahs.count, Some(114));
        assert_eq!(envelope.data.surahs.references[0].english_name, "Al-Faatiha");
        assert_eq!(envelope.data.surahs.references[0].number_of_ayahs, 7);
    }

    #[test]
    fn test_parse_equran_detail() {
        let json = r#"{
            "code": 200,
            "message": "Data retrieved successfully",
            "data": {
                "nomor": 112,
                "nama": "الإخلاص",
                "namaLatin": "Al-Ikhlas",
                "jumlahAyat": 4,
                "tempatTurun": "Mekah",
                "arti": "Ikhlas",
                "deskripsi": "<i>Surat</i> ...",
                "audioFull": { "02": "https://cdn.test/b.mp3", "01": "https://cdn.test/a.mp3" },
                "ayat": [
                    {
                        "nomorAyat": 1,
                        "teksArab": "قُلْ هُوَ اللّٰهُ اَحَدٌۚ",
                        "teksLatin": "Qul huwallāhu aḥad(un).",
                        "teksIndonesia": "Katakanlah (Nabi Muhammad), “Dialah Allah Yang Maha Esa.",
                        "audio": { "01": "https://cdn.test/112001.mp3" }
                    }
                ],
                "suratSelanjutnya": false
            }
        }"#;

        let envelope: EquranEnvelope<EquranSuratDetail> = serde_json::from_str(json).unwrap();
        let detail = envelope.data;
        assert_eq!(detail.surat.nama_latin, "Al-Ikhlas");
        assert_eq!(
            detail.surat.audio_full.values().next().map(String::as_str),
            Some("https://cdn.test/a.mp3")
        );
        assert_eq!(detail.ayat[0].nomor_ayat, 1);
        assert!(detail.ayat[0].teks_latin.is_some());
    }
}
